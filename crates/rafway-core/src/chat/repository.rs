//! ChatLogRepository trait definition.

use rafway_types::chat::ChatExchange;
use rafway_types::error::RepositoryError;
use rafway_types::profile::{Profile, UserId};

/// Persistence for the server-side exchange log.
///
/// Implementations live in rafway-infra (e.g., `SqliteChatLogRepository`).
pub trait ChatLogRepository: Send + Sync {
    /// In one transaction: append `exchange`, increment the owner's
    /// `message_count`, and stamp `last_active_at`. Returns the updated profile.
    ///
    /// Fails with `NotFound` if the owner's profile does not exist.
    fn record_exchange(
        &self,
        exchange: &ChatExchange,
    ) -> impl std::future::Future<Output = Result<Profile, RepositoryError>> + Send;

    /// Most recent exchanges for a user, newest first.
    fn list_exchanges(
        &self,
        uid: &UserId,
        limit: i64,
    ) -> impl std::future::Future<Output = Result<Vec<ChatExchange>, RepositoryError>> + Send;
}
