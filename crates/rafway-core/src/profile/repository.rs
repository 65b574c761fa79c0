//! Profile repository trait definition.

use rafway_types::error::RepositoryError;
use rafway_types::profile::{Profile, UserId};

/// Repository trait for profile persistence.
///
/// Implementations live in rafway-infra (e.g., `SqliteProfileRepository`).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait ProfileRepository: Send + Sync {
    /// Insert a new profile. Fails with `Conflict` if the uid or email exists.
    fn create(
        &self,
        profile: &Profile,
    ) -> impl std::future::Future<Output = Result<Profile, RepositoryError>> + Send;

    /// Get a profile by user id.
    fn get(
        &self,
        uid: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<Profile>, RepositoryError>> + Send;

    /// Get a profile by email address.
    fn get_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<Profile>, RepositoryError>> + Send;

    /// Overwrite an existing profile. Fails with `NotFound` if it does not exist.
    ///
    /// The stored `message_count` never decreases: a stale write carrying a
    /// lower counter keeps the stored value.
    fn save(
        &self,
        profile: &Profile,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Add one sent message to the stored counter and touch `last_active_at`.
    ///
    /// Fails with `NotFound` if the profile does not exist.
    fn increment_message_count(
        &self,
        uid: &UserId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
