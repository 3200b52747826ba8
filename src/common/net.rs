//! Network utility functions
//!
//! Address resolution for the listening side and free-port discovery used
//! when picking the public port or the loopback backend port.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener};

use super::error::{ProxyError, Result};

/// Number of consecutive ports probed by [`find_available_port`] by default
pub const DEFAULT_PORT_TRIES: u16 = 20;

/// Address of a backend bound on the IPv4 loopback interface
pub fn loopback_addr(port: u16) -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
}

/// Resolve a bind host and port into a socket address
///
/// `host` may be an IPv4 literal, an IPv6 literal (with or without brackets)
/// or a hostname. The first resolved address wins.
///
/// # Errors
///
/// Returns `ProxyError::Config` when the host cannot be resolved.
pub async fn resolve_bind_addr(host: &str, port: u16) -> Result<SocketAddr> {
    let host = host.trim_start_matches('[').trim_end_matches(']');

    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }

    let mut addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| ProxyError::Config(format!("Failed to resolve {}: {}", host, e)))?;

    addrs
        .next()
        .ok_or_else(|| ProxyError::Config(format!("No address found for {}", host)))
}

/// Find a port on `host` that can currently be bound
///
/// Probes `start`, `start + 1`, ... for at most `max_tries` candidates and
/// returns the first one that binds. When every candidate is taken the
/// operating system is asked for an ephemeral port instead.
///
/// # Errors
///
/// Returns an error only if even the ephemeral fallback cannot be bound.
pub fn find_available_port(host: &str, start: u16, max_tries: u16) -> Result<u16> {
    for offset in 0..max_tries {
        let Some(port) = start.checked_add(offset) else {
            break;
        };
        if TcpListener::bind((host, port)).is_ok() {
            return Ok(port);
        }
        log::debug!("Port {} on {} is busy", port, host);
    }

    let listener = TcpListener::bind((host, 0))?;
    Ok(listener.local_addr()?.port())
}
