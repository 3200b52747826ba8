//! Shared helpers for integration tests

#![allow(dead_code)]

use openssl::ssl::{SslConnector, SslMethod, SslVerifyMode};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_openssl::SslStream;

use ovscode_tls_proxy::{start_tls_proxy, ProxyConfig, ProxyHandle};

#[path = "../../src/tls/test_support.rs"]
mod test_support;

/// Upper bound for any single wait in these tests
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Self-signed certificate and key living in a temporary directory
pub struct TestCert {
    _dir: TempDir,
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl TestCert {
    pub fn generate() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let (cert, key) = test_support::write_self_signed(dir.path(), "localhost");
        Self { _dir: dir, cert, key }
    }
}

/// A proxy on an ephemeral port plus the certificate it serves
pub struct TestProxy {
    pub handle: ProxyHandle,
    _cert: TestCert,
}

impl TestProxy {
    pub async fn start(backend_port: u16) -> Self {
        Self::start_with(backend_port, |_| {}).await
    }

    pub async fn start_with(backend_port: u16, tweak: impl FnOnce(&mut ProxyConfig)) -> Self {
        let cert = TestCert::generate();
        let mut config = ProxyConfig::new("127.0.0.1", 0, backend_port, &cert.cert, &cert.key);
        tweak(&mut config);
        let handle = start_tls_proxy(&config).await.unwrap();
        Self { handle, _cert: cert }
    }

    pub fn addr(&self) -> SocketAddr {
        self.handle.local_addr()
    }
}

/// TLS client that accepts any server certificate
pub async fn connect_tls(addr: SocketAddr) -> std::io::Result<SslStream<TcpStream>> {
    let mut builder = SslConnector::builder(SslMethod::tls()).map_err(std::io::Error::other)?;
    builder.set_verify(SslVerifyMode::NONE);
    let ssl = builder
        .build()
        .configure()
        .map_err(std::io::Error::other)?
        .verify_hostname(false)
        .into_ssl("localhost")
        .map_err(std::io::Error::other)?;

    let tcp = TcpStream::connect(addr).await?;
    let mut stream = SslStream::new(ssl, tcp).map_err(std::io::Error::other)?;
    Pin::new(&mut stream)
        .connect()
        .await
        .map_err(std::io::Error::other)?;
    Ok(stream)
}

/// Send `payload`, half-close, and collect everything that comes back
pub async fn round_trip(addr: SocketAddr, payload: &[u8]) -> Vec<u8> {
    let stream = connect_tls(addr).await.unwrap();
    let (mut reader, mut writer) = tokio::io::split(stream);
    let payload = payload.to_vec();

    let write = async move {
        writer.write_all(&payload).await.unwrap();
        writer.shutdown().await.unwrap();
    };
    let read = async move {
        let mut received = Vec::new();
        reader.read_to_end(&mut received).await.unwrap();
        received
    };

    let ((), received) = tokio::time::timeout(TEST_TIMEOUT, async { tokio::join!(write, read) })
        .await
        .expect("round trip timed out");
    received
}

/// Bind a backend listener on an ephemeral loopback port
pub async fn backend_listener() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

/// Echo backend: every connection gets its bytes back, then EOF
pub async fn spawn_echo_backend() -> u16 {
    let (listener, port) = backend_listener().await;
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let (mut reader, mut writer) = stream.split();
                let _ = tokio::io::copy(&mut reader, &mut writer).await;
                let _ = writer.shutdown().await;
            });
        }
    });
    port
}

/// A port with nothing listening on it
pub async fn closed_port() -> u16 {
    let (listener, port) = backend_listener().await;
    drop(listener);
    port
}
