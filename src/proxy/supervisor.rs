//! Proxy supervisor
//!
//! Brings the TLS listener up and starts the accept loop in the background.

use log::{error, info};
use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::common::{resolve_bind_addr, ProxyError, Result};
use crate::config::ProxyConfig;
use crate::tls::create_tls_acceptor;
use super::server::{AcceptLoop, LoopState};

/// Pending-connection queue length of the listening socket
pub const LISTEN_BACKLOG: i32 = 128;

/// Handle to a running proxy
///
/// Dropping the handle does not stop the proxy; the accept loop keeps
/// running for as long as the runtime does.
#[derive(Debug)]
pub struct ProxyHandle {
    /// Address the listener is bound to
    local_addr: SocketAddr,
    /// Plaintext backend connections are relayed to
    backend_addr: SocketAddr,
    /// The accept loop task
    task: JoinHandle<()>,
}

impl ProxyHandle {
    /// Bound address; differs from the configured one when port 0 was requested
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Backend address
    pub fn backend_addr(&self) -> SocketAddr {
        self.backend_addr
    }

    /// Current accept loop state
    pub fn state(&self) -> LoopState {
        if self.task.is_finished() {
            LoopState::Stopped
        } else {
            LoopState::Running
        }
    }

    /// Stop accepting new connections
    ///
    /// Connections already being relayed run to completion.
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Wait for the accept loop to stop
    pub async fn wait(self) -> Result<()> {
        match self.task.await {
            Ok(()) => Ok(()),
            Err(e) if e.is_cancelled() => Ok(()),
            Err(e) => Err(ProxyError::Other(format!("Accept loop panicked: {}", e))),
        }
    }
}

/// Bind a listening socket with `SO_REUSEADDR` and [`LISTEN_BACKLOG`]
fn bind_listener(addr: SocketAddr) -> Result<TcpListener> {
    let bind_err = move |source| ProxyError::Bind { addr, source };

    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
        .map_err(bind_err)?;
    socket.set_reuse_address(true).map_err(bind_err)?;
    socket.set_nonblocking(true).map_err(bind_err)?;
    socket.bind(&addr.into()).map_err(bind_err)?;
    socket.listen(LISTEN_BACKLOG).map_err(bind_err)?;

    TcpListener::from_std(socket.into()).map_err(bind_err)
}

/// Start the TLS-terminating proxy described by `config`
///
/// Loads the certificate and key, binds the listener and spawns the accept
/// loop, then returns without waiting for any client. Must be called from
/// within a Tokio runtime.
///
/// # Errors
///
/// Fails if the certificate or key cannot be loaded, the host cannot be
/// resolved, or the address cannot be bound. Nothing is listening in
/// that case.
///
/// # Example
///
/// ```no_run
/// use ovscode_tls_proxy::{start_tls_proxy, ProxyConfig, Result};
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let config = ProxyConfig::new("0.0.0.0", 8443, 41000, "cert.pem", "key.pem");
///     let handle = start_tls_proxy(&config).await?;
///     handle.wait().await
/// }
/// ```
pub async fn start_tls_proxy(config: &ProxyConfig) -> Result<ProxyHandle> {
    let tls_acceptor = create_tls_acceptor(&config.cert_path, &config.key_path)
        .map_err(|e| {
            error!("Unable to load TLS certificate: {}", e);
            e
        })?;

    let bind_addr = resolve_bind_addr(&config.host, config.port).await?;
    let listener = bind_listener(bind_addr).map_err(|e| {
        error!("{}", e);
        e
    })?;
    let local_addr = listener.local_addr()?;
    let backend_addr = config.backend_addr();

    info!("HTTPS proxy listening on {} -> {}", local_addr, backend_addr);

    let accept_loop = AcceptLoop::new(
        listener,
        Arc::new(tls_acceptor),
        backend_addr,
        config.max_connections,
    )
    .with_connect_timeout(config.connect_timeout())
    .with_handshake_timeout(config.handshake_timeout());

    let task = tokio::spawn(accept_loop.run());

    Ok(ProxyHandle {
        local_addr,
        backend_addr,
        task,
    })
}
