//! In-memory fakes of the repository and provider traits for unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use dashmap::DashMap;

use rafway_types::chat::ChatExchange;
use rafway_types::error::RepositoryError;
use rafway_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};
use rafway_types::profile::{Profile, UserId};

use crate::auth::repository::TokenRepository;
use crate::auth::token::TokenHasher;
use crate::chat::repository::ChatLogRepository;
use crate::llm::provider::LlmProvider;
use crate::profile::repository::ProfileRepository;

#[derive(Clone, Default)]
pub struct InMemoryProfileRepository {
    profiles: Arc<DashMap<UserId, Profile>>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, profile: Profile) {
        self.profiles.insert(profile.uid.clone(), profile);
    }

    pub fn get_sync(&self, uid: &UserId) -> Option<Profile> {
        self.profiles.get(uid).map(|p| p.clone())
    }
}

impl ProfileRepository for InMemoryProfileRepository {
    async fn create(&self, profile: &Profile) -> Result<Profile, RepositoryError> {
        let email_taken = profile.email.is_some()
            && self.profiles.iter().any(|p| p.email == profile.email);
        if email_taken || self.profiles.contains_key(&profile.uid) {
            return Err(RepositoryError::Conflict("profile exists".into()));
        }
        self.insert(profile.clone());
        Ok(profile.clone())
    }

    async fn get(&self, uid: &UserId) -> Result<Option<Profile>, RepositoryError> {
        Ok(self.get_sync(uid))
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Profile>, RepositoryError> {
        Ok(self
            .profiles
            .iter()
            .find(|p| p.email.as_deref() == Some(email))
            .map(|p| p.clone()))
    }

    async fn save(&self, profile: &Profile) -> Result<(), RepositoryError> {
        let mut stored = self
            .profiles
            .get_mut(&profile.uid)
            .ok_or(RepositoryError::NotFound)?;
        let message_count = stored.message_count.max(profile.message_count);
        *stored = Profile {
            message_count,
            ..profile.clone()
        };
        Ok(())
    }

    async fn increment_message_count(&self, uid: &UserId) -> Result<(), RepositoryError> {
        let mut stored = self.profiles.get_mut(uid).ok_or(RepositoryError::NotFound)?;
        stored.message_count += 1;
        stored.last_active_at = Some(Utc::now());
        Ok(())
    }
}

/// Every call fails with a connection error.
pub struct FailingProfileRepository;

impl ProfileRepository for FailingProfileRepository {
    async fn create(&self, _profile: &Profile) -> Result<Profile, RepositoryError> {
        Err(RepositoryError::Connection)
    }

    async fn get(&self, _uid: &UserId) -> Result<Option<Profile>, RepositoryError> {
        Err(RepositoryError::Connection)
    }

    async fn get_by_email(&self, _email: &str) -> Result<Option<Profile>, RepositoryError> {
        Err(RepositoryError::Connection)
    }

    async fn save(&self, _profile: &Profile) -> Result<(), RepositoryError> {
        Err(RepositoryError::Connection)
    }

    async fn increment_message_count(&self, _uid: &UserId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Connection)
    }
}

/// In-memory profiles whose `get` answers only after a delay.
#[derive(Clone)]
pub struct SlowGetProfileRepository {
    pub inner: InMemoryProfileRepository,
    pub delay: std::time::Duration,
}

impl ProfileRepository for SlowGetProfileRepository {
    async fn create(&self, profile: &Profile) -> Result<Profile, RepositoryError> {
        self.inner.create(profile).await
    }

    async fn get(&self, uid: &UserId) -> Result<Option<Profile>, RepositoryError> {
        tokio::time::sleep(self.delay).await;
        self.inner.get(uid).await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Profile>, RepositoryError> {
        self.inner.get_by_email(email).await
    }

    async fn save(&self, profile: &Profile) -> Result<(), RepositoryError> {
        self.inner.save(profile).await
    }

    async fn increment_message_count(&self, uid: &UserId) -> Result<(), RepositoryError> {
        self.inner.increment_message_count(uid).await
    }
}

#[derive(Clone)]
pub struct InMemoryChatLogRepository {
    profiles: InMemoryProfileRepository,
    exchanges: Arc<DashMap<uuid::Uuid, ChatExchange>>,
}

impl InMemoryChatLogRepository {
    pub fn new(profiles: InMemoryProfileRepository) -> Self {
        Self {
            profiles,
            exchanges: Arc::new(DashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }
}

impl ChatLogRepository for InMemoryChatLogRepository {
    async fn record_exchange(&self, exchange: &ChatExchange) -> Result<Profile, RepositoryError> {
        let updated = {
            let mut profile = self
                .profiles
                .profiles
                .get_mut(&exchange.uid)
                .ok_or(RepositoryError::NotFound)?;
            profile.message_count += 1;
            profile.last_active_at = Some(Utc::now());
            profile.clone()
        };
        self.exchanges.insert(exchange.id, exchange.clone());
        Ok(updated)
    }

    async fn list_exchanges(
        &self,
        uid: &UserId,
        limit: i64,
    ) -> Result<Vec<ChatExchange>, RepositoryError> {
        let mut found: Vec<ChatExchange> = self
            .exchanges
            .iter()
            .filter(|e| &e.uid == uid)
            .map(|e| e.clone())
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found.truncate(limit.max(0) as usize);
        Ok(found)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryTokenRepository {
    tokens: Arc<DashMap<String, UserId>>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenRepository for InMemoryTokenRepository {
    async fn insert(&self, uid: &UserId, token_hash: &str) -> Result<(), RepositoryError> {
        self.tokens.insert(token_hash.to_string(), uid.clone());
        Ok(())
    }

    async fn find_user(&self, token_hash: &str) -> Result<Option<UserId>, RepositoryError> {
        Ok(self.tokens.get(token_hash).map(|uid| uid.clone()))
    }

    async fn revoke(&self, token_hash: &str) -> Result<bool, RepositoryError> {
        Ok(self.tokens.remove(token_hash).is_some())
    }
}

/// Deterministic tokens: `token-1`, `token-2`, ...
#[derive(Default)]
pub struct PlainTokenHasher {
    next: AtomicU64,
}

impl TokenHasher for PlainTokenHasher {
    fn generate(&self) -> String {
        format!("token-{}", self.next.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn hash(&self, token: &str) -> String {
        format!("hash:{token}")
    }
}

/// Replies `echo: <last message>`, plus the message count when given context.
pub struct EchoProvider;

impl LlmProvider for EchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    fn default_model(&self) -> &str {
        "echo-1"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let last = request
            .messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        let content = match request.messages.len() {
            1 => format!("echo: {last}"),
            n => format!("echo: {last} ({n} messages)"),
        };
        Ok(CompletionResponse {
            content,
            model: self.default_model().to_string(),
            usage: Usage::default(),
        })
    }
}

pub struct FailingProvider;

impl LlmProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    fn default_model(&self) -> &str {
        "failing-1"
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Err(LlmError::Provider {
            message: "connection reset".into(),
        })
    }
}

/// Never answers.
pub struct PendingProvider;

impl LlmProvider for PendingProvider {
    fn name(&self) -> &str {
        "pending"
    }

    fn default_model(&self) -> &str {
        "pending-1"
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        std::future::pending().await
    }
}
