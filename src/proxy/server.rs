//! Accept loop
//!
//! Owns the listening socket and hands every accepted connection to its
//! own task: TLS handshake first, then the connection handler.

use log::{debug, error, info};
use openssl::ssl::SslAcceptor;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tokio::time::timeout;

use crate::common::Result;
use crate::tls::accept_tls;
use super::handler::handle_connection;

/// Lifecycle of the accept loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Accepting connections
    Running,
    /// `accept` failed (or the loop was aborted); no new connections
    Stopped,
}

/// The accept loop of one listening endpoint
///
/// At most `max_connections` connections (handshaking or relaying) are
/// served at a time. Once the cap is reached the loop stops calling
/// `accept` and new clients wait in the kernel backlog. A handshake
/// timeout keeps silent clients from holding a slot forever.
pub struct AcceptLoop {
    /// Listening socket
    listener: TcpListener,
    /// Shared, read-only TLS server context
    tls_acceptor: Arc<SslAcceptor>,
    /// Plaintext backend every connection is relayed to
    backend_addr: SocketAddr,
    /// Admission control
    limiter: Arc<Semaphore>,
    /// Optional backend connect timeout
    connect_timeout: Option<Duration>,
    /// Optional limit on the TLS handshake
    handshake_timeout: Option<Duration>,
}

impl AcceptLoop {
    /// Create an accept loop over a bound listener
    pub fn new(
        listener: TcpListener,
        tls_acceptor: Arc<SslAcceptor>,
        backend_addr: SocketAddr,
        max_connections: usize,
    ) -> Self {
        let permits = max_connections.clamp(1, Semaphore::MAX_PERMITS);
        Self {
            listener,
            tls_acceptor,
            backend_addr,
            limiter: Arc::new(Semaphore::new(permits)),
            connect_timeout: None,
            handshake_timeout: None,
        }
    }

    /// Bound backend connection attempts by `connect_timeout`
    pub fn with_connect_timeout(mut self, connect_timeout: Option<Duration>) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Drop clients that have not completed the TLS handshake within `handshake_timeout`
    pub fn with_handshake_timeout(mut self, handshake_timeout: Option<Duration>) -> Self {
        self.handshake_timeout = handshake_timeout;
        self
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Run until `accept` fails
    ///
    /// Every accepted connection runs in its own task, so a slow handshake
    /// or a long-lived relay never delays the next `accept`.
    pub async fn run(self) {
        loop {
            // The semaphore is never closed, so this only waits.
            let Ok(permit) = Arc::clone(&self.limiter).acquire_owned().await else {
                break;
            };

            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("Accept failed, proxy stopped: {}", e);
                    break;
                }
            };

            let tls_acceptor = Arc::clone(&self.tls_acceptor);
            let backend_addr = self.backend_addr;
            let timeouts = Timeouts {
                handshake: self.handshake_timeout,
                connect: self.connect_timeout,
            };

            tokio::spawn(async move {
                serve_connection(stream, peer, &tls_acceptor, backend_addr, timeouts).await;
                drop(permit);
            });
        }

        info!("Accept loop stopped");
    }
}

#[derive(Debug, Clone, Copy)]
struct Timeouts {
    handshake: Option<Duration>,
    connect: Option<Duration>,
}

/// Handshake, then relay; every failure stays inside this connection
async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    tls_acceptor: &SslAcceptor,
    backend_addr: SocketAddr,
    timeouts: Timeouts,
) {
    if let Err(e) = stream.set_nodelay(true) {
        debug!("Failed to set TCP_NODELAY for {}: {}", peer, e);
    }

    let handshake = accept_tls(tls_acceptor, stream);
    let handshake = match timeouts.handshake {
        Some(limit) => match timeout(limit, handshake).await {
            Ok(result) => result,
            Err(_) => {
                debug!("Discarding connection from {}: no TLS handshake within {:?}", peer, limit);
                return;
            }
        },
        None => handshake.await,
    };

    let tls_stream = match handshake {
        Ok(tls_stream) => tls_stream,
        Err(e) => {
            debug!("Discarding connection from {}: {}", peer, e);
            return;
        }
    };

    debug!("Relaying {} -> {}", peer, backend_addr);

    match handle_connection(tls_stream, backend_addr, timeouts.connect).await {
        Ok(stats) => debug!(
            "Connection from {} closed ({} bytes up, {} bytes down)",
            peer, stats.to_backend, stats.to_client
        ),
        Err(e) => debug!("Backend {} unavailable for {}: {}", backend_addr, peer, e),
    }
}
