//! Certificate inspection
//!
//! Used to print what is being served at startup.

use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::x509::X509;
use std::fs;
use std::path::Path;

use crate::common::{ProxyError, Result};

/// Load the leaf certificate from a PEM file
pub fn load_cert(cert_path: &Path) -> Result<X509> {
    let pem = fs::read(cert_path)?;
    X509::from_pem(&pem).map_err(|e| {
        ProxyError::Certificate(format!("Failed to parse {}: {}", cert_path.display(), e))
    })
}

/// Get the certificate subject as `KEY=value` pairs joined by `, `
pub fn get_cert_subject(cert_path: &Path) -> Result<String> {
    let cert = load_cert(cert_path)?;

    let parts: Vec<String> = cert
        .subject_name()
        .entries()
        .map(|entry| {
            let key = entry.object().nid().short_name().unwrap_or("?");
            let value = entry.data().to_string().unwrap_or_default();
            format!("{}={}", key, value)
        })
        .collect();

    Ok(parts.join(", "))
}

/// Get the common name, if the subject carries one
pub fn get_cert_common_name(cert_path: &Path) -> Result<Option<String>> {
    let cert = load_cert(cert_path)?;
    let cn = cert
        .subject_name()
        .entries_by_nid(Nid::COMMONNAME)
        .next()
        .and_then(|entry| entry.data().to_string().ok());
    Ok(cn)
}

/// Get the SHA-256 fingerprint as colon-separated uppercase hex
pub fn get_cert_fingerprint(cert_path: &Path) -> Result<String> {
    let cert = load_cert(cert_path)?;
    let digest = cert.digest(MessageDigest::sha256())?;

    Ok(digest
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":"))
}
