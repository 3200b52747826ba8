//! ovscode-tls-proxy: TLS termination for a loopback-bound editor server
//!
//! openvscode-server only speaks plain HTTP. This crate accepts TLS
//! connections on a public address, decrypts them, and relays the raw byte
//! stream to the editor listening on `127.0.0.1`. Nothing above TCP is
//! interpreted, so HTTP/1.1, WebSocket upgrades and HTTP/2 all pass through
//! unchanged.
//!
//! # Main Features
//!
//! - Task-per-connection relay with correct half-close in both directions
//! - Bounded concurrency through an admission semaphore
//! - Non-blocking start: the caller gets a handle as soon as the port is bound
//!
//! # Example
//!
//! ```no_run
//! use ovscode_tls_proxy::{start_tls_proxy, ProxyConfig, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Public HTTPS on 0.0.0.0:8443, editor on 127.0.0.1:41000
//!     let config = ProxyConfig::new("0.0.0.0", 8443, 41000, "cert.pem", "key.pem");
//!
//!     let handle = start_tls_proxy(&config).await?;
//!     println!("serving on {}", handle.local_addr());
//!
//!     handle.wait().await
//! }
//! ```

pub mod common;
pub mod config;
pub mod proxy;
pub mod tls;

// Re-export commonly used structures and functions for convenience
pub use common::{ProxyError, Result};
pub use config::ProxyConfig;
pub use proxy::{start_tls_proxy, LoopState, ProxyHandle};
pub use tls::create_tls_acceptor;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
