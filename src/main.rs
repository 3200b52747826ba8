//! ovscode-tls-proxy command line tool
//!
//! Runs the TLS-terminating proxy in front of an already running
//! openvscode-server until Ctrl+C.

use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;

use ovscode_tls_proxy::common::{find_available_port, init_logger, net::DEFAULT_PORT_TRIES, Result};
use ovscode_tls_proxy::config::{ConfigLoader, ConfigMerger, ProxyConfig};
use ovscode_tls_proxy::tls::{get_cert_common_name, get_cert_fingerprint, get_cert_subject};
use ovscode_tls_proxy::{start_tls_proxy, APP_NAME, VERSION};

/// TLS termination in front of a loopback-bound openvscode-server
#[derive(Parser, Debug)]
#[clap(version = VERSION, about, long_about = None)]
struct Args {
    /// Bind address [default: 127.0.0.1]
    #[clap(long)]
    host: Option<String>,

    /// Bind port [default: 3000]
    #[clap(long)]
    port: Option<u16>,

    /// Port of the plaintext backend on 127.0.0.1
    #[clap(long)]
    backend_port: Option<u16>,

    /// Path to the TLS certificate (PEM)
    #[clap(long)]
    cert: Option<PathBuf>,

    /// Path to the TLS private key (PEM, unencrypted)
    #[clap(long)]
    cert_key: Option<PathBuf>,

    /// Maximum number of connections served at once [default: 1024]
    #[clap(long)]
    max_connections: Option<usize>,

    /// Backend connect timeout in seconds [default: none]
    #[clap(long)]
    connect_timeout: Option<u64>,

    /// TLS handshake timeout in seconds [default: none]
    #[clap(long)]
    handshake_timeout: Option<u64>,

    /// Log level [default: info]
    #[clap(long)]
    log_level: Option<String>,

    /// Load configuration from a JSON file
    #[clap(long, env = "OVSCODE_PROXY_CONFIG_FILE")]
    config_file: Option<PathBuf>,

    /// Move to the next free port if the bind port is taken
    #[clap(long)]
    auto_port: bool,
}

impl Args {
    /// Command line values override everything else
    fn apply(&self, mut config: ProxyConfig) -> ProxyConfig {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(backend_port) = self.backend_port {
            config.backend_port = backend_port;
        }
        if let Some(cert) = &self.cert {
            config.cert_path = cert.clone();
        }
        if let Some(key) = &self.cert_key {
            config.key_path = key.clone();
        }
        if let Some(max_connections) = self.max_connections {
            config.max_connections = max_connections;
        }
        if let Some(connect_timeout) = self.connect_timeout {
            config.connect_timeout = Some(connect_timeout);
        }
        if let Some(handshake_timeout) = self.handshake_timeout {
            config.handshake_timeout = Some(handshake_timeout);
        }
        if let Some(log_level) = &self.log_level {
            config.log_level = log_level.clone();
        }
        config
    }
}

/// defaults < config file < OVSCODE_PROXY_* variables < command line
fn load_config(args: &Args) -> Result<ProxyConfig> {
    let mut config = ProxyConfig::default();

    if let Some(path) = &args.config_file {
        config = config.merge(ProxyConfig::from_file(path)?);
    }

    let config = config.apply_env()?;
    Ok(args.apply(config))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(&args)?;

    init_logger(&config.log_level);
    info!("Starting {} v{}", APP_NAME, VERSION);

    config.validate()?;

    if args.auto_port {
        let port = find_available_port(&config.host, config.port, DEFAULT_PORT_TRIES)?;
        if port != config.port {
            warn!("Port {} is in use, using {} instead", config.port, port);
            config.port = port;
        }
    }

    match get_cert_subject(&config.cert_path) {
        Ok(subject) => info!("Certificate subject: {}", subject),
        Err(e) => warn!("Unable to get certificate subject: {}", e),
    }
    match get_cert_common_name(&config.cert_path) {
        Ok(Some(cn)) => info!("Certificate common name: {}", cn),
        Ok(None) => warn!("Certificate subject has no common name"),
        Err(e) => warn!("Unable to get certificate common name: {}", e),
    }
    match get_cert_fingerprint(&config.cert_path) {
        Ok(fingerprint) => info!("Certificate fingerprint: {}", fingerprint),
        Err(e) => warn!("Unable to get certificate fingerprint: {}", e),
    }

    let handle = start_tls_proxy(&config).await?;
    info!("Proxy ready at https://{}, press Ctrl+C to stop", handle.local_addr());

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Stopped");
        }
        result = handle.wait() => {
            result?;
            warn!("Accept loop ended, exiting");
        }
    }

    Ok(())
}
