//! Configuration loading functionality
//!
//! Loads `ProxyConfig` from JSON files and `OVSCODE_PROXY_*` environment variables.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::{ProxyError, Result};
use crate::config::defaults::ENV_PREFIX;
use crate::config::ProxyConfig;

/// Trait for loading configuration from different sources
pub trait ConfigLoader {
    /// Load configuration from a JSON file
    fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> where Self: Sized;

    /// Load configuration from environment variables
    ///
    /// Unset variables keep their default value.
    fn from_env() -> Result<Self> where Self: Sized;

    /// Override values with the environment variables that are set
    ///
    /// A variable that is present always wins, even when its value equals
    /// the default.
    fn apply_env(self) -> Result<Self> where Self: Sized;
}

impl ConfigLoader for ProxyConfig {
    fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = fs::read_to_string(path)
            .map_err(|e| ProxyError::Config(format!("Failed to read config file {}: {}", path.display(), e)))?;

        serde_json::from_str(&content)
            .map_err(|e| ProxyError::Config(format!("Failed to parse JSON config file {}: {}", path.display(), e)))
    }

    fn from_env() -> Result<Self> {
        Self::default().apply_env()
    }

    fn apply_env(self) -> Result<Self> {
        let get_env = |name: &str| -> Option<String> {
            env::var(format!("{}{}", ENV_PREFIX, name)).ok()
        };

        fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
            value.trim().parse::<T>().map_err(|_| {
                ProxyError::Config(format!("Invalid value for {}{}: {}", ENV_PREFIX, name, value))
            })
        }

        let mut config = self;

        if let Some(value) = get_env("HOST") {
            config.host = value;
        }
        if let Some(value) = get_env("PORT") {
            config.port = parse_number("PORT", &value)?;
        }
        if let Some(value) = get_env("BACKEND_PORT") {
            config.backend_port = parse_number("BACKEND_PORT", &value)?;
        }
        if let Some(value) = get_env("CERT") {
            config.cert_path = PathBuf::from(value);
        }
        if let Some(value) = get_env("CERT_KEY") {
            config.key_path = PathBuf::from(value);
        }
        if let Some(value) = get_env("MAX_CONNECTIONS") {
            config.max_connections = parse_number("MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = get_env("CONNECT_TIMEOUT") {
            config.connect_timeout = Some(parse_number("CONNECT_TIMEOUT", &value)?);
        }
        if let Some(value) = get_env("HANDSHAKE_TIMEOUT") {
            config.handshake_timeout = Some(parse_number("HANDSHAKE_TIMEOUT", &value)?);
        }
        if let Some(value) = get_env("LOG_LEVEL") {
            config.log_level = value;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "HOST", "PORT", "BACKEND_PORT", "CERT", "CERT_KEY",
        "MAX_CONNECTIONS", "CONNECT_TIMEOUT", "HANDSHAKE_TIMEOUT", "LOG_LEVEL",
    ];

    fn clear_env() {
        for name in VARS {
            env::remove_var(format!("{}{}", ENV_PREFIX, name));
        }
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proxy.json");
        fs::write(&path, r#"{
            "host": "0.0.0.0",
            "port": 8443,
            "backend_port": 41000,
            "cert_path": "/etc/ovscode/cert.pem",
            "key_path": "/etc/ovscode/key.pem",
            "max_connections": 64,
            "connect_timeout": 5
        }"#).unwrap();

        let config = ProxyConfig::from_file(&path).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8443);
        assert_eq!(config.backend_port, 41000);
        assert_eq!(config.cert_path, PathBuf::from("/etc/ovscode/cert.pem"));
        assert_eq!(config.max_connections, 64);
        assert_eq!(config.connect_timeout, Some(5));
        // Unlisted fields fall back to defaults
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_from_file_rejects_unknown_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proxy.json");
        fs::write(&path, r#"{ "listen": "0.0.0.0:8443" }"#).unwrap();

        let err = ProxyConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ProxyError::Config(_)));
    }

    #[test]
    fn test_from_missing_file() {
        assert!(ProxyConfig::from_file("/nonexistent/proxy.json").is_err());
    }

    #[test]
    #[serial]
    fn test_from_env() {
        clear_env();
        env::set_var("OVSCODE_PROXY_HOST", "::");
        env::set_var("OVSCODE_PROXY_BACKEND_PORT", "41001");
        env::set_var("OVSCODE_PROXY_CONNECT_TIMEOUT", "7");

        let config = ProxyConfig::from_env().unwrap();
        clear_env();

        assert_eq!(config.host, "::");
        assert_eq!(config.backend_port, 41001);
        assert_eq!(config.connect_timeout, Some(7));
        assert_eq!(config.port, 3000);
    }

    #[test]
    #[serial]
    fn test_apply_env_overrides_with_default_value() {
        clear_env();
        env::set_var("OVSCODE_PROXY_PORT", "3000");
        env::set_var("OVSCODE_PROXY_HANDSHAKE_TIMEOUT", "10");

        let base = ProxyConfig {
            port: 8443,
            backend_port: 41000,
            ..ProxyConfig::default()
        };
        let config = base.apply_env();
        clear_env();

        let config = config.unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.handshake_timeout, Some(10));
        assert_eq!(config.backend_port, 41000);
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_number() {
        clear_env();
        env::set_var("OVSCODE_PROXY_PORT", "not-a-port");

        let result = ProxyConfig::from_env();
        clear_env();

        assert!(result.is_err());
    }
}
