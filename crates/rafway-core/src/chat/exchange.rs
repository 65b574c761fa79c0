//! Server-side chat exchange.
//!
//! Unlike an interactive `ChatSession`, the exchange is server-authoritative:
//! the quota is checked against the stored profile, and the counter is
//! charged only after generation succeeds, in the same transaction that
//! logs the question and answer.

use serde::Serialize;
use tracing::{info, warn};

use rafway_types::chat::{ChatExchange, HistoryEntry};
use rafway_types::error::ExchangeError;
use rafway_types::profile::UserId;

use super::prompt::{self, PromptOptions};
use super::repository::ChatLogRepository;
use crate::llm::box_provider::BoxLlmProvider;
use crate::profile::repository::ProfileRepository;
use crate::quota;

/// Result of a successful exchange call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExchangeOutcome {
    Replied {
        text: String,
        remaining_free_messages: Option<u32>,
    },
    /// The free quota is spent. Not an error.
    QuotaExceeded { message: String },
}

/// Runs exchanges against stored profiles and logs them.
pub struct ExchangeService<P: ProfileRepository, L: ChatLogRepository> {
    profiles: P,
    log: L,
    options: PromptOptions,
}

impl<P: ProfileRepository, L: ChatLogRepository> ExchangeService<P, L> {
    /// History is always forwarded on this path; `options` only supplies
    /// sampling settings.
    pub fn new(profiles: P, log: L, options: PromptOptions) -> Self {
        Self {
            profiles,
            log,
            options: PromptOptions {
                include_history: true,
                ..options
            },
        }
    }

    /// Answer `text` for the authenticated user `uid`.
    pub async fn exchange(
        &self,
        uid: &UserId,
        text: &str,
        history: &[HistoryEntry],
        provider: &BoxLlmProvider,
    ) -> Result<ExchangeOutcome, ExchangeError> {
        if text.trim().is_empty() {
            return Err(ExchangeError::EmptyMessage);
        }

        let profile = self
            .profiles
            .get(uid)
            .await?
            .ok_or(ExchangeError::ProfileNotFound)?;

        if !quota::allowed(&profile) {
            info!(%uid, message_count = profile.message_count, "exchange refused, quota exceeded");
            return Ok(ExchangeOutcome::QuotaExceeded {
                message: prompt::QUOTA_EXCEEDED_MESSAGE.to_string(),
            });
        }

        let request = prompt::build_request(prompt::SERVER_PROMPT, history, text, &self.options);
        let response = provider.complete(&request).await.map_err(|e| {
            warn!(%uid, error = %e, "exchange generation failed");
            ExchangeError::Generation(e.to_string())
        })?;

        let exchange = ChatExchange::new(uid.clone(), text.to_string(), response.content);
        let updated = self.log.record_exchange(&exchange).await?;

        info!(
            %uid,
            exchange_id = %exchange.id,
            message_count = updated.message_count,
            "exchange recorded"
        );

        Ok(ExchangeOutcome::Replied {
            text: exchange.response,
            remaining_free_messages: quota::remaining_free_messages(&updated),
        })
    }
}
