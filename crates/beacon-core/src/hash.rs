/// Stable hashing primitives (C2): SHA-1 for chunk identity keys, SHA-256 for
/// content hashes that drive incremental reindex.
use sha1::Sha1;
use sha2::{Digest, Sha256};

/// `sha1(parts.join("|"))`, hex-encoded lowercase.
pub fn sha1_join(parts: &[&str]) -> String {
    let joined = parts.join("|");
    let mut hasher = Sha1::new();
    hasher.update(joined.as_bytes());
    hex::encode(hasher.finalize())
}

/// `sha256(text)`, hex-encoded lowercase.
pub fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_join_is_stable() {
        let a = sha1_join(&["scope", "/docs/intro", "0", "introduction"]);
        let b = sha1_join(&["scope", "/docs/intro", "0", "introduction"]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 40);
    }

    #[test]
    fn sha256_is_stable_and_sensitive() {
        let a = sha256_hex("hello world");
        let b = sha256_hex("hello world");
        let c = sha256_hex("hello world!");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }
}
