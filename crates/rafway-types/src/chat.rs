//! Chat message, session state, and exchange log types for Raf Way.
//!
//! These types model a conversation between a user and Raf: the
//! append-only transcript, the session's send/receive state, and the
//! server-side exchange log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::profile::UserId;

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for Sender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Sender::User),
            // "bot" is what older clients send for assistant turns
            "assistant" | "bot" => Ok(Sender::Assistant),
            other => Err(format!("invalid sender: '{other}'")),
        }
    }
}

/// A single message in a chat transcript. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a message authored by the user.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    /// Create a message authored by the assistant.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, text)
    }

    fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
        }
    }
}

/// Send/receive state of a chat session.
///
/// - Idle: ready to accept a message
/// - Sending: one generation request is outstanding
/// - PaywallBlocked: the free quota is spent; input is refused until upgrade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Sending,
    PaywallBlocked,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Sending => write!(f, "sending"),
            SessionState::PaywallBlocked => write!(f, "paywall_blocked"),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Idle
    }
}

/// One prior turn supplied by a client to the server-side exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub sender: Sender,
    pub text: String,
}

impl From<&ChatMessage> for HistoryEntry {
    fn from(message: &ChatMessage) -> Self {
        Self {
            sender: message.sender,
            text: message.text.clone(),
        }
    }
}

/// A persisted question/answer pair written by the server-side exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatExchange {
    pub id: Uuid,
    pub uid: UserId,
    pub text: String,
    pub response: String,
    pub created_at: DateTime<Utc>,
}

impl ChatExchange {
    pub fn new(uid: UserId, text: String, response: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            uid,
            text,
            response,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_roundtrip() {
        for sender in [Sender::User, Sender::Assistant] {
            let parsed: Sender = sender.to_string().parse().unwrap();
            assert_eq!(sender, parsed);
        }
    }

    #[test]
    fn test_sender_accepts_bot_alias() {
        assert_eq!("bot".parse::<Sender>().unwrap(), Sender::Assistant);
        assert!("system".parse::<Sender>().is_err());
    }

    #[test]
    fn test_session_state_serde() {
        let json = serde_json::to_string(&SessionState::PaywallBlocked).unwrap();
        assert_eq!(json, "\"paywall_blocked\"");
        assert_eq!(SessionState::default(), SessionState::Idle);
    }

    #[test]
    fn test_message_constructors() {
        let user = ChatMessage::user("Salut");
        let bot = ChatMessage::assistant("Bonjour !");
        assert_eq!(user.sender, Sender::User);
        assert_eq!(bot.sender, Sender::Assistant);
        assert_ne!(user.id, bot.id);
        assert_eq!(HistoryEntry::from(&user).text, "Salut");
    }
}
