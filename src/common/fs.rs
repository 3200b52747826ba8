//! File system helpers

use std::path::Path;

use super::error::{ProxyError, Result};

/// Check that `path` exists and is a regular file
///
/// # Errors
///
/// Returns `ProxyError::Config` when the path is missing or is not a file.
pub fn check_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(ProxyError::Config(format!(
            "File does not exist: {}",
            path.display()
        )));
    }

    if !path.is_file() {
        return Err(ProxyError::Config(format!(
            "Path is not a file: {}",
            path.display()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("cert.pem");
        std::fs::write(&file, b"pem").unwrap();

        assert!(check_file_exists(&file).is_ok());
        assert!(check_file_exists(&dir.path().join("missing.pem")).is_err());
        // A directory is not a file
        assert!(check_file_exists(dir.path()).is_err());
    }
}
