//! SHA-256 bearer token hashing.
//!
//! Implements the `TokenHasher` trait from `rafway-core` using the `sha2`
//! crate for digests and the OS random source for token bytes.

use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use rafway_core::auth::token::TokenHasher;

/// Prefix that makes Raf Way tokens recognizable in logs and config files.
const TOKEN_PREFIX: &str = "rafw_";

/// Mints `rafw_`-prefixed 256-bit tokens and hashes them with SHA-256.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256TokenHasher;

impl Sha256TokenHasher {
    pub fn new() -> Self {
        Self
    }
}

impl TokenHasher for Sha256TokenHasher {
    fn generate(&self) -> String {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        format!(
            "{TOKEN_PREFIX}{}",
            bytes.iter().map(|b| format!("{b:02x}")).collect::<String>()
        )
    }

    fn hash(&self, token: &str) -> String {
        let digest = Sha256::digest(token.as_bytes());
        format!("{:x}", digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_known_value() {
        let hasher = Sha256TokenHasher::new();
        // SHA-256 of empty string
        assert_eq!(
            hasher.hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_generated_tokens_are_unique_and_prefixed() {
        let hasher = Sha256TokenHasher::new();
        let a = hasher.generate();
        let b = hasher.generate();
        assert_ne!(a, b);
        assert!(a.starts_with("rafw_"));
        assert_eq!(a.len(), TOKEN_PREFIX.len() + 64);
    }

    #[test]
    fn test_hash_is_lowercase_hex() {
        let hasher = Sha256TokenHasher::new();
        let hash = hasher.hash("rafw_test");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
