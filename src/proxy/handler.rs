//! Connection handler module
//!
//! Pairs one decrypted client connection with a fresh backend connection
//! and relays both directions until each has finished.

use log::debug;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::common::{ProxyError, Result};
use super::pipe::{pipe, PipeOutcome};

/// Byte counts of a finished connection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionStats {
    /// Bytes relayed from the client to the backend
    pub to_backend: u64,
    /// Bytes relayed from the backend to the client
    pub to_client: u64,
}

/// Open the backend connection, optionally bounded by a timeout
async fn connect_backend(
    backend_addr: SocketAddr,
    connect_timeout: Option<Duration>,
) -> Result<TcpStream> {
    let stream = bounded_connect(
        backend_addr,
        connect_timeout,
        TcpStream::connect(backend_addr),
    )
    .await?;

    stream.set_nodelay(true)?;
    Ok(stream)
}

/// Await `connect`, giving up with `TimedOut` once `connect_timeout` elapses
async fn bounded_connect<F>(
    backend_addr: SocketAddr,
    connect_timeout: Option<Duration>,
    connect: F,
) -> Result<TcpStream>
where
    F: Future<Output = io::Result<TcpStream>>,
{
    match connect_timeout {
        Some(limit) => timeout(limit, connect)
            .await
            .map_err(|_| ProxyError::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("Connecting to {} timed out", backend_addr),
            )))?
            .map_err(ProxyError::from),
        None => Ok(connect.await?),
    }
}

/// Handle a single client connection
///
/// `client` is an already-established TLS stream. A new backend connection
/// is opened and two pipe tasks copy client→backend and backend→client.
/// The handler returns once both have finished; both connections are owned
/// by those tasks and are closed when they end.
///
/// # Errors
///
/// Returns an error only if the backend cannot be reached. The client
/// connection has been dropped (and thus closed) by then. Relay failures
/// are part of normal teardown and are not reported.
pub async fn handle_connection<S>(
    client: S,
    backend_addr: SocketAddr,
    connect_timeout: Option<Duration>,
) -> Result<ConnectionStats>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let backend = match connect_backend(backend_addr, connect_timeout).await {
        Ok(stream) => stream,
        Err(e) => {
            drop(client);
            return Err(e);
        }
    };

    let (mut client_reader, mut client_writer) = tokio::io::split(client);
    let (mut backend_reader, mut backend_writer) = backend.into_split();

    let upstream = tokio::spawn(async move {
        pipe(&mut client_reader, &mut backend_writer).await
    });
    let downstream = tokio::spawn(async move {
        pipe(&mut backend_reader, &mut client_writer).await
    });

    let (upstream, downstream) = tokio::join!(upstream, downstream);

    let bytes = |joined: std::result::Result<PipeOutcome, tokio::task::JoinError>| match joined {
        Ok(outcome) => outcome.bytes,
        Err(e) => {
            debug!("Pipe task did not complete: {}", e);
            0
        }
    };

    Ok(ConnectionStats {
        to_backend: bytes(upstream),
        to_client: bytes(downstream),
    })
}
