use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Unique identifier for an authenticated user, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Create a new UserId using UUID v7.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create a UserId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// The authenticated user's plan and usage record.
///
/// Identity fields come from sign-in; `is_premium` and `message_count` are
/// the only fields the quota gate reads. `message_count` only ever goes up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub uid: UserId,
    pub email: Option<String>,
    pub display_name: Option<String>,
    /// Avatar image URL (None for the default avatar).
    pub photo_url: Option<String>,
    pub is_premium: bool,
    pub message_count: u32,
    pub created_at: DateTime<Utc>,
    /// Last time the server-side exchange recorded a message for this user.
    #[serde(default)]
    pub last_active_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Create a fresh free-tier profile with a zero message counter.
    pub fn new(
        uid: UserId,
        email: Option<String>,
        display_name: Option<String>,
        photo_url: Option<String>,
    ) -> Self {
        Self {
            uid,
            email,
            display_name,
            photo_url,
            is_premium: false,
            message_count: 0,
            created_at: Utc::now(),
            last_active_at: None,
        }
    }

    /// First word of the display name, used to greet the user.
    pub fn first_name(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .and_then(|name| name.split_whitespace().next())
    }
}

/// Sign-in details supplied by the identity collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignInRequest {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}
