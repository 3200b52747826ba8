//! TLS acceptor creation and per-connection server handshakes

use log::{debug, info};
use openssl::ssl::{Ssl, SslAcceptor, SslFiletype, SslMethod, SslVerifyMode};
use std::path::Path;
use std::pin::Pin;
use tokio::net::TcpStream;
use tokio_openssl::SslStream;

use crate::common::{check_file_exists, ProxyError, Result};

/// Create the server-side TLS context from a PEM certificate chain and key
///
/// Client certificates are not requested and no ALPN protocols are
/// advertised beyond OpenSSL's defaults.
///
/// # Errors
///
/// Fails if either file is missing or unparsable, or if the key does not
/// belong to the certificate.
///
/// # Example
///
/// ```no_run
/// # use std::path::Path;
/// # use ovscode_tls_proxy::tls::create_tls_acceptor;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let acceptor = create_tls_acceptor(
///     Path::new("certs/cert.pem"),
///     Path::new("certs/key.pem"),
/// )?;
/// # Ok(())
/// # }
/// ```
pub fn create_tls_acceptor(cert_path: &Path, key_path: &Path) -> Result<SslAcceptor> {
    check_file_exists(cert_path)
        .map_err(|e| ProxyError::Certificate(format!("certificate: {}", e)))?;
    check_file_exists(key_path)
        .map_err(|e| ProxyError::Certificate(format!("private key: {}", e)))?;

    let mut acceptor = SslAcceptor::mozilla_intermediate_v5(SslMethod::tls())?;

    acceptor
        .set_certificate_chain_file(cert_path)
        .map_err(|e| ProxyError::Certificate(format!(
            "Failed to load certificate {}: {}", cert_path.display(), e
        )))?;
    acceptor
        .set_private_key_file(key_path, SslFiletype::PEM)
        .map_err(|e| ProxyError::Certificate(format!(
            "Failed to load private key {}: {}", key_path.display(), e
        )))?;
    acceptor
        .check_private_key()
        .map_err(|e| ProxyError::Certificate(format!(
            "Private key does not match certificate: {}", e
        )))?;

    acceptor.set_verify(SslVerifyMode::NONE);

    info!("Loaded TLS certificate from {}", cert_path.display());
    Ok(acceptor.build())
}

/// Run the server side of a TLS handshake on an accepted TCP stream
///
/// On failure the stream is dropped, which closes the raw connection.
pub async fn accept_tls(
    acceptor: &SslAcceptor,
    stream: TcpStream,
) -> Result<SslStream<TcpStream>> {
    let ssl = Ssl::new(acceptor.context())?;
    let mut stream = SslStream::new(ssl, stream)?;

    Pin::new(&mut stream)
        .accept()
        .await
        .map_err(|e| ProxyError::TlsHandshake(e.to_string()))?;

    debug!(
        "TLS handshake complete ({})",
        stream.ssl().version_str()
    );
    Ok(stream)
}
