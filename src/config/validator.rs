//! Configuration validator

use log::warn;

use crate::common::{check_file_exists, ProxyError, Result};
use crate::config::ProxyConfig;

/// Validate the configuration
///
/// Catches problems that would otherwise only show up as a bind or
/// certificate failure after startup.
pub fn validate_config(config: &ProxyConfig) -> Result<()> {
    validate_network_settings(config)?;
    validate_certificate_settings(config)?;
    validate_general_settings(config)?;
    Ok(())
}

fn validate_network_settings(config: &ProxyConfig) -> Result<()> {
    if config.host.trim().is_empty() {
        return Err(ProxyError::Config("Bind host must not be empty".to_string()));
    }

    if config.port == 0 {
        return Err(ProxyError::Config(
            "Bind port must be between 1 and 65535".to_string(),
        ));
    }

    if config.backend_port == 0 {
        return Err(ProxyError::Config(
            "Backend port must be between 1 and 65535".to_string(),
        ));
    }

    Ok(())
}

fn validate_certificate_settings(config: &ProxyConfig) -> Result<()> {
    check_file_exists(&config.cert_path)
        .map_err(|e| ProxyError::Config(format!("Certificate: {}", e)))?;
    check_file_exists(&config.key_path)
        .map_err(|e| ProxyError::Config(format!("Private key: {}", e)))?;
    Ok(())
}

fn validate_general_settings(config: &ProxyConfig) -> Result<()> {
    match config.log_level.as_str() {
        "error" | "warn" | "info" | "debug" | "trace" => {}
        level => warn!("Unknown log level: {}. RUST_LOG style filters are passed through as-is", level),
    }

    if config.max_connections == 0 {
        return Err(ProxyError::Config(
            "max_connections must be greater than 0".to_string(),
        ));
    }

    if config.connect_timeout == Some(0) {
        return Err(ProxyError::Config(
            "connect_timeout must be greater than 0 when set".to_string(),
        ));
    }

    if config.handshake_timeout == Some(0) {
        return Err(ProxyError::Config(
            "handshake_timeout must be greater than 0 when set".to_string(),
        ));
    }

    Ok(())
}
