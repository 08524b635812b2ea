//! Content fingerprints
//!
//! A fingerprint is the first 16 hex characters of the SHA-256 digest of a
//! file's bytes. It is only used for change detection inside one install,
//! so the truncated digest space is plenty.

use sha2::{Digest, Sha256};
use std::path::Path;

/// Number of hex characters kept from the digest
pub const FINGERPRINT_LEN: usize = 16;

/// Fingerprint a byte slice.
pub fn fingerprint_bytes(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(FINGERPRINT_LEN);
    hex
}

/// Fingerprint a file on disk.
///
/// Returns `None` when the file is absent or unreadable.
pub fn fingerprint_file(path: &Path) -> Option<String> {
    match std::fs::read(path) {
        Ok(content) => Some(fingerprint_bytes(&content)),
        Err(e) => {
            tracing::trace!("cannot fingerprint {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_has_fixed_length() {
        assert_eq!(fingerprint_bytes(b"hello world").len(), FINGERPRINT_LEN);
        assert_eq!(fingerprint_bytes(b"").len(), FINGERPRINT_LEN);
    }

    #[test]
    fn fingerprint_is_deterministic() {
        assert_eq!(fingerprint_bytes(b"test"), fingerprint_bytes(b"test"));
    }

    #[test]
    fn different_content_different_fingerprint() {
        assert_ne!(fingerprint_bytes(b"aaa"), fingerprint_bytes(b"bbb"));
    }

    #[test]
    fn fingerprint_known_value() {
        // sha256("hello world") = b94d27b9934d3e08...
        assert_eq!(fingerprint_bytes(b"hello world"), "b94d27b9934d3e08");
    }

    #[test]
    fn file_fingerprint_matches_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.txt");
        std::fs::write(&path, "hello world").unwrap();

        assert_eq!(
            fingerprint_file(&path),
            Some(fingerprint_bytes(b"hello world"))
        );
    }

    #[test]
    fn missing_file_has_no_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(fingerprint_file(&dir.path().join("absent.md")), None);
    }
}
