//! TLS handling module
//!
//! Builds the shared server context and inspects the served certificate.

mod acceptor;
mod cert;
#[cfg(test)]
pub(crate) mod test_support;

pub use acceptor::{accept_tls, create_tls_acceptor};
pub use cert::{get_cert_common_name, get_cert_fingerprint, get_cert_subject, load_cert};
