//! TokenRepository trait definition.

use rafway_types::error::RepositoryError;
use rafway_types::profile::UserId;

/// Persistence for bearer token hashes. Plaintext tokens are never stored.
pub trait TokenRepository: Send + Sync {
    /// Bind a token hash to a user.
    fn insert(
        &self,
        uid: &UserId,
        token_hash: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Resolve a token hash to its user, if the token is live.
    fn find_user(
        &self,
        token_hash: &str,
    ) -> impl std::future::Future<Output = Result<Option<UserId>, RepositoryError>> + Send;

    /// Revoke a token. Returns whether a token was removed.
    fn revoke(
        &self,
        token_hash: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}
