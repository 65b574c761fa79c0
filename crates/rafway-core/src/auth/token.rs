//! TokenHasher trait for minting and hashing bearer tokens.
//!
//! Defined here so `AuthService` stays independent of the random source and
//! hash algorithm. The `Sha256TokenHasher` adapter lives in rafway-infra.

pub trait TokenHasher: Send + Sync {
    /// Produce a new random plaintext token.
    fn generate(&self) -> String;

    /// Hex-encoded hash of a plaintext token, as stored by `TokenRepository`.
    fn hash(&self, token: &str) -> String;
}
