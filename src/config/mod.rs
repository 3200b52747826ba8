//! Configuration module
//!
//! This module handles proxy configuration: defaults, loading from JSON files
//! and environment variables, layering sources, and validation.

pub mod defaults;
mod loader;
mod merger;
mod validator;

pub use self::defaults::ENV_PREFIX;
pub use self::loader::ConfigLoader;
pub use self::merger::ConfigMerger;
pub use self::validator::validate_config;

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::common::{loopback_addr, Result};

/// Proxy configuration
///
/// Everything the supervisor needs to bring the TLS listener up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
#[serde(default)]
pub struct ProxyConfig {
    /// Bind host (IPv4/IPv6 literal or hostname)
    #[serde(default = "defaults::host")]
    pub host: String,

    /// Public TLS port
    #[serde(default = "defaults::port")]
    pub port: u16,

    /// Plaintext backend port on 127.0.0.1
    #[serde(default = "defaults::backend_port")]
    pub backend_port: u16,

    /// PEM certificate chain
    #[serde(default = "defaults::cert_path")]
    pub cert_path: PathBuf,

    /// PEM private key, unencrypted
    #[serde(default = "defaults::key_path")]
    pub key_path: PathBuf,

    /// Maximum number of connections served at once
    /// When reached, the accept loop waits for a connection to finish
    #[serde(default = "defaults::max_connections")]
    pub max_connections: usize,

    /// Backend connect timeout in seconds; none means the OS default
    #[serde(default = "defaults::connect_timeout", skip_serializing_if = "Option::is_none")]
    pub connect_timeout: Option<u64>,

    /// TLS handshake timeout in seconds; none means a client may take as long as it likes
    #[serde(default = "defaults::handshake_timeout", skip_serializing_if = "Option::is_none")]
    pub handshake_timeout: Option<u64>,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "defaults::log_level")]
    pub log_level: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: defaults::host(),
            port: defaults::port(),
            backend_port: defaults::backend_port(),
            cert_path: defaults::cert_path(),
            key_path: defaults::key_path(),
            max_connections: defaults::max_connections(),
            connect_timeout: defaults::connect_timeout(),
            handshake_timeout: defaults::handshake_timeout(),
            log_level: defaults::log_level(),
        }
    }
}

impl ProxyConfig {
    /// Create a configuration from the five required inputs
    ///
    /// The remaining options keep their defaults.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        backend_port: u16,
        cert_path: impl Into<PathBuf>,
        key_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            backend_port,
            cert_path: cert_path.into(),
            key_path: key_path.into(),
            ..Self::default()
        }
    }

    /// Address of the plaintext backend
    pub fn backend_addr(&self) -> SocketAddr {
        loopback_addr(self.backend_port)
    }

    /// Backend connect timeout, if one is configured
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout.map(Duration::from_secs)
    }

    /// TLS handshake timeout, if one is configured
    pub fn handshake_timeout(&self) -> Option<Duration> {
        self.handshake_timeout.map(Duration::from_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_config(self)
    }
}
