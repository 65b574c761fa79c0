//! Concurrent registry of open chat sessions, keyed by session id.
//!
//! Each session sits behind its own async mutex. Callers hold the lock only
//! to begin or complete a submit, never while generation is awaited, so a
//! concurrent submit on the same session observes `Sending` and is ignored.
//!
//! Every lookup marks the session as used; `remove_idle` closes the ones
//! nobody has touched for a while.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use rafway_types::profile::UserId;

use super::session::ChatSession;

struct Entry {
    owner: UserId,
    session: Arc<Mutex<ChatSession>>,
    cancellation: CancellationToken,
    last_used: Instant,
}

/// Open sessions shared across request handlers.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<Uuid, Entry>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `session` for `owner` and return its id.
    pub fn insert(&self, owner: UserId, session: ChatSession) -> Uuid {
        let id = session.id();
        let cancellation = session.cancellation_token();
        self.sessions.insert(
            id,
            Entry {
                owner,
                session: Arc::new(Mutex::new(session)),
                cancellation,
                last_used: Instant::now(),
            },
        );
        id
    }

    /// Look up a session. Sessions owned by someone else are invisible.
    pub fn get(&self, id: &Uuid, owner: &UserId) -> Option<Arc<Mutex<ChatSession>>> {
        let mut entry = self.sessions.get_mut(id).filter(|entry| &entry.owner == owner)?;
        entry.last_used = Instant::now();
        Some(Arc::clone(&entry.session))
    }

    /// Close and forget a session. Any in-flight reply is dropped.
    pub fn remove(&self, id: &Uuid, owner: &UserId) -> bool {
        match self.sessions.remove_if(id, |_, entry| &entry.owner == owner) {
            Some((_, entry)) => {
                entry.cancellation.cancel();
                debug!(session_id = %id, "session removed from registry");
                true
            }
            None => false,
        }
    }

    /// Close every session owned by `owner` (sign-out). Returns how many closed.
    pub fn remove_all_for(&self, owner: &UserId) -> usize {
        let mut closed = 0;
        self.sessions.retain(|_, entry| {
            if &entry.owner == owner {
                entry.cancellation.cancel();
                closed += 1;
                false
            } else {
                true
            }
        });
        closed
    }

    /// Close every session unused for at least `max_idle`. Returns how many closed.
    pub fn remove_idle(&self, max_idle: Duration) -> usize {
        let mut closed = 0;
        self.sessions.retain(|id, entry| {
            if entry.last_used.elapsed() >= max_idle {
                entry.cancellation.cancel();
                debug!(session_id = %id, "idle session closed");
                closed += 1;
                false
            } else {
                true
            }
        });
        closed
    }

    pub fn has_sessions_for(&self, owner: &UserId) -> bool {
        self.sessions.iter().any(|entry| &entry.owner == owner)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
