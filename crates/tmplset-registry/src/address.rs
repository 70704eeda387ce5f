use sha2::{Digest, Sha256};

/// Content digest of a persisted bundle, as `sha256:<hex>`
pub fn bundle_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{:x}", hasher.finalize())
}

/// Check that `bytes` match a digest produced by [`bundle_digest`]
pub fn verify_digest(bytes: &[u8], expected: &str) -> bool {
    bundle_digest(bytes) == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_format() {
        let digest = bundle_digest(b"hello world");

        assert!(digest.starts_with("sha256:"));
        assert_eq!(digest.len(), 71);
        assert_eq!(digest, bundle_digest(b"hello world"));
        assert_ne!(digest, bundle_digest(b"hello world!"));
    }

    #[test]
    fn test_verify_digest() {
        let digest = bundle_digest(b"bundle");
        assert!(verify_digest(b"bundle", &digest));
        assert!(!verify_digest(b"other", &digest));
    }
}
