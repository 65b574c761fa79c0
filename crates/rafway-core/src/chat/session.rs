//! Chat session state machine.
//!
//! A `ChatSession` owns the visible transcript of one conversation with Raf
//! and decides, through the quota gate, whether a message may be sent.
//!
//! ```text
//! Idle --submit, gate allows--> Sending --reply or failure--> Idle
//! Idle --submit, gate denies--> PaywallBlocked
//! Idle --profile at limit observed--> PaywallBlocked
//! PaywallBlocked --profile upgraded observed--> Idle
//! ```
//!
//! The message counter is charged when the user message is appended, before
//! generation resolves, and is never refunded.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use rafway_types::chat::{ChatMessage, HistoryEntry, SessionState};
use rafway_types::llm::{CompletionRequest, CompletionResponse, LlmError};
use rafway_types::profile::Profile;

use super::prompt::{self, PromptOptions};
use crate::llm::box_provider::BoxLlmProvider;
use crate::profile::store::SessionStore;
use crate::quota;

/// Result of asking the session to accept a message.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Empty text, a request already in flight, or a closed session.
    Ignored,
    /// No profile is loaded.
    SignedOut,
    /// The free quota is spent; the session is now `PaywallBlocked`.
    Blocked,
    /// The message was appended and charged; the reply is still owed.
    Accepted(PendingReply),
}

/// Generation request owed for an accepted message.
#[derive(Debug)]
pub struct PendingReply {
    request: CompletionRequest,
    cancellation: CancellationToken,
}

impl PendingReply {
    pub fn request(&self) -> &CompletionRequest {
        &self.request
    }

    /// Run the generation call. Returns `None` if the session was closed first.
    pub async fn resolve(
        self,
        provider: &BoxLlmProvider,
    ) -> Option<Result<CompletionResponse, LlmError>> {
        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => None,
            result = provider.complete(&self.request) => Some(result),
        }
    }
}

/// End-to-end result of [`ChatSession::submit`].
#[derive(Debug)]
pub enum SubmitResult {
    Ignored,
    SignedOut,
    Blocked,
    /// The assistant message appended to the transcript.
    Replied(ChatMessage),
    /// The session was closed while generation was in flight.
    Cancelled,
}

/// Serializable view of a session for the API and `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub state: SessionState,
    pub transcript: Vec<ChatMessage>,
    pub remaining_free_messages: Option<u32>,
    pub created_at: DateTime<Utc>,
}

/// One conversation with Raf.
pub struct ChatSession {
    id: Uuid,
    transcript: Vec<ChatMessage>,
    state: SessionState,
    draft: String,
    store: SessionStore,
    profile_rx: watch::Receiver<Option<Profile>>,
    cancellation: CancellationToken,
    options: PromptOptions,
    created_at: DateTime<Utc>,
}

impl ChatSession {
    /// Open a session for the store's current profile.
    ///
    /// The transcript starts with the greeting. A profile that is already at
    /// the limit is observed immediately, so the session may start blocked.
    pub fn new(store: SessionStore, options: PromptOptions) -> Self {
        let profile = store.current();
        let greeting = prompt::greeting(profile.as_ref().and_then(Profile::first_name));
        let profile_rx = store.subscribe();

        let mut session = Self {
            id: Uuid::now_v7(),
            transcript: vec![ChatMessage::assistant(greeting)],
            state: SessionState::Idle,
            draft: String::new(),
            store,
            profile_rx,
            cancellation: CancellationToken::new(),
            options,
            created_at: Utc::now(),
        };
        session.sync_profile();
        debug!(session_id = %session.id, state = %session.state, "chat session opened");
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Pending, unsent input.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn is_closed(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Token cancelled by [`close`](Self::close). Clone it to close the
    /// session from elsewhere while a reply is awaited.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Re-evaluate the paywall against the latest observed profile.
    pub fn sync_profile(&mut self) -> SessionState {
        let allowed = self
            .profile_rx
            .borrow_and_update()
            .as_ref()
            .map(quota::allowed);

        match (self.state, allowed) {
            (SessionState::Idle, Some(false)) => {
                info!(session_id = %self.id, "free quota spent, paywall shown");
                self.state = SessionState::PaywallBlocked;
            }
            (SessionState::PaywallBlocked, Some(true)) => {
                info!(session_id = %self.id, "paywall lifted");
                self.state = SessionState::Idle;
            }
            _ => {}
        }
        self.state
    }

    /// First half of a submit: gate, append, charge, and build the request.
    pub fn begin_submit(&mut self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() || self.state == SessionState::Sending || self.is_closed() {
            return SubmitOutcome::Ignored;
        }

        self.sync_profile();
        let Some(profile) = self.store.current() else {
            return SubmitOutcome::SignedOut;
        };
        if !quota::allowed(&profile) {
            self.state = SessionState::PaywallBlocked;
            return SubmitOutcome::Blocked;
        }

        let history: Vec<HistoryEntry> = self.transcript.iter().map(HistoryEntry::from).collect();
        self.transcript.push(ChatMessage::user(text));
        self.draft.clear();
        self.store.record_message_sent();
        self.state = SessionState::Sending;

        debug!(
            session_id = %self.id,
            uid = %profile.uid,
            message_count = profile.message_count.saturating_add(1),
            "message accepted"
        );

        SubmitOutcome::Accepted(PendingReply {
            request: prompt::build_request(prompt::PERSONA_PROMPT, &history, text, &self.options),
            cancellation: self.cancellation.clone(),
        })
    }

    /// Second half of a submit: append the reply (or fallback) and return to `Idle`.
    ///
    /// Returns `None` if no request was in flight.
    pub fn complete_submit(
        &mut self,
        result: Result<CompletionResponse, LlmError>,
    ) -> Option<&ChatMessage> {
        if self.state != SessionState::Sending {
            return None;
        }

        let text = match result {
            Ok(response) if response.content.trim().is_empty() => prompt::NO_REPLY_TEXT.to_string(),
            Ok(response) => response.content,
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "generation failed, using fallback reply");
                prompt::FALLBACK_REPLY.to_string()
            }
        };

        self.transcript.push(ChatMessage::assistant(text));
        self.state = SessionState::Idle;
        self.sync_profile();
        self.transcript.last()
    }

    /// Drop an in-flight request without a reply. The charge stands.
    pub fn abandon_submit(&mut self) {
        if self.state == SessionState::Sending {
            debug!(session_id = %self.id, "in-flight reply dropped");
            self.state = SessionState::Idle;
        }
    }

    /// Send `text` and wait for Raf's reply.
    pub async fn submit(&mut self, text: &str, provider: &BoxLlmProvider) -> SubmitResult {
        let pending = match self.begin_submit(text) {
            SubmitOutcome::Accepted(pending) => pending,
            SubmitOutcome::Ignored => return SubmitResult::Ignored,
            SubmitOutcome::SignedOut => return SubmitResult::SignedOut,
            SubmitOutcome::Blocked => return SubmitResult::Blocked,
        };

        match pending.resolve(provider).await {
            Some(result) => match self.complete_submit(result) {
                Some(reply) => SubmitResult::Replied(reply.clone()),
                None => SubmitResult::Ignored,
            },
            None => {
                self.abandon_submit();
                SubmitResult::Cancelled
            }
        }
    }

    /// Close the session. An in-flight generation is cancelled and its reply dropped.
    pub fn close(&self) {
        if !self.cancellation.is_cancelled() {
            debug!(session_id = %self.id, "chat session closed");
            self.cancellation.cancel();
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            state: self.state,
            transcript: self.transcript.clone(),
            remaining_free_messages: self
                .store
                .current()
                .as_ref()
                .and_then(quota::remaining_free_messages),
            created_at: self.created_at,
        }
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}
