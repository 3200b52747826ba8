//! Default configuration values
//!
//! Single source of truth for every default used by `ProxyConfig`.

use std::path::PathBuf;

/// Environment variable prefix for all configuration options
pub const ENV_PREFIX: &str = "OVSCODE_PROXY_";

/// Default bind host
pub const HOST_STR: &str = "127.0.0.1";

/// Default bind port
pub const PORT: u16 = 3000;

/// Default log level as string
pub const LOG_LEVEL_STR: &str = "info";

/// Default cap on concurrently served connections
pub const MAX_CONNECTIONS: usize = 1024;

/// Default bind host
pub fn host() -> String {
    HOST_STR.to_string()
}

/// Default bind port
pub fn port() -> u16 {
    PORT
}

/// Backend port has no meaningful default; zero means "not configured"
pub fn backend_port() -> u16 {
    0
}

/// Certificate path has no default
pub fn cert_path() -> PathBuf {
    PathBuf::new()
}

/// Private key path has no default
pub fn key_path() -> PathBuf {
    PathBuf::new()
}

/// Default maximum number of concurrent connections
pub fn max_connections() -> usize {
    MAX_CONNECTIONS
}

/// No backend connect timeout unless configured
pub fn connect_timeout() -> Option<u64> {
    None
}

/// No handshake timeout unless configured
pub fn handshake_timeout() -> Option<u64> {
    None
}

/// Default log level
pub fn log_level() -> String {
    LOG_LEVEL_STR.to_string()
}
