//! Self-signed certificates for unit and integration tests

use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair};
use std::path::{Path, PathBuf};

/// Write `cert.pem` and `key.pem` for `common_name` into `dir`
pub fn write_self_signed(dir: &Path, common_name: &str) -> (PathBuf, PathBuf) {
    let key_pair = KeyPair::generate().unwrap();
    let mut params =
        CertificateParams::new(vec![common_name.to_string(), "127.0.0.1".to_string()]).unwrap();
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    params.distinguished_name = dn;
    let cert = params.self_signed(&key_pair).unwrap();

    let cert_path = dir.join("cert.pem");
    let key_path = dir.join("key.pem");
    std::fs::write(&cert_path, cert.pem()).unwrap();
    std::fs::write(&key_path, key_pair.serialize_pem()).unwrap();
    (cert_path, key_path)
}
