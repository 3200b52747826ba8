//! Common module
//!
//! This module contains shared errors and utility functions used throughout the application.

pub mod error;
pub mod fs;
pub mod log;
pub mod net;

// Re-export commonly used types and functions
pub use self::error::{ProxyError, Result};
pub use self::fs::check_file_exists;
pub use self::log::init_logger;
pub use self::net::{find_available_port, loopback_addr, resolve_bind_addr};
