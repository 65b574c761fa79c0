//! In-process session store for the signed-in user's profile.
//!
//! The store is the single source of truth for the current `Profile`
//! inside one process. Readers subscribe to a `watch` channel and see every
//! change. Writes update the in-memory value immediately and are queued on
//! an `mpsc` channel consumed by a writer task, so persistence happens in
//! the order changes were made and never blocks the caller.
//!
//! A load issued after a save goes through the same queue, so it observes
//! that save. Charges are persisted as increments, and a load never lowers
//! the in-memory counter for the same user, so no charge is lost to a load
//! racing a send.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, warn};

use rafway_types::profile::{Profile, UserId};

use super::repository::ProfileRepository;

enum StoreCommand {
    Save(Profile),
    Charge(UserId),
    Load {
        uid: UserId,
        reply: oneshot::Sender<Option<Profile>>,
    },
    Flush(oneshot::Sender<()>),
}

/// Shared handle to the current user's profile.
///
/// Cloning the handle is cheap; all clones observe the same profile and
/// feed the same writer queue.
#[derive(Clone)]
pub struct SessionStore {
    current: Arc<watch::Sender<Option<Profile>>>,
    commands: mpsc::UnboundedSender<StoreCommand>,
}

impl SessionStore {
    /// Create a store backed by `repo` and spawn its writer task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<R: ProfileRepository + 'static>(repo: R) -> Self {
        let (current, _) = watch::channel(None);
        let (commands, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(repo, rx));
        Self {
            current: Arc::new(current),
            commands,
        }
    }

    /// Load the profile for `uid` and make it current.
    ///
    /// Storage failures are logged and yield `None`; a missing profile also
    /// yields `None`. When the current profile belongs to the same user, a
    /// charge or upgrade applied while the load was pending is kept.
    pub async fn load(&self, uid: &UserId) -> Option<Profile> {
        let (reply, rx) = oneshot::channel();
        let loaded = if self
            .commands
            .send(StoreCommand::Load {
                uid: uid.clone(),
                reply,
            })
            .is_ok()
        {
            rx.await.ok().flatten()
        } else {
            warn!(%uid, "profile writer is gone, cannot load profile");
            None
        };
        let mut merged = None;
        self.current.send_modify(|current| {
            *current = merge_loaded(current.take(), loaded);
            merged = current.clone();
        });
        merged
    }

    /// Make `profile` current and queue it for persistence.
    pub fn save(&self, profile: Profile) {
        self.current.send_replace(Some(profile.clone()));
        self.enqueue_save(profile);
    }

    /// Apply `f` to the current profile, persist the result, and return it.
    ///
    /// Does nothing and returns `None` when no profile is loaded.
    pub fn update<F>(&self, f: F) -> Option<Profile>
    where
        F: FnOnce(&mut Profile),
    {
        let mut updated = None;
        self.current.send_if_modified(|current| match current {
            Some(profile) => {
                f(profile);
                updated = Some(profile.clone());
                true
            }
            None => false,
        });
        if let Some(profile) = &updated {
            self.enqueue_save(profile.clone());
        }
        updated
    }

    /// Count one sent message against the current profile.
    ///
    /// Persisted as an increment, so charges made elsewhere are kept.
    pub fn record_message_sent(&self) -> Option<Profile> {
        let mut charged = None;
        self.current.send_if_modified(|current| match current {
            Some(profile) => {
                profile.message_count = profile.message_count.saturating_add(1);
                charged = Some(profile.clone());
                true
            }
            None => false,
        });
        if let Some(profile) = &charged {
            if self.commands.send(StoreCommand::Charge(profile.uid.clone())).is_err() {
                warn!("profile writer is gone, charge kept in memory only");
            }
        }
        charged
    }

    /// Wait until every write queued so far has been attempted.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.commands.send(StoreCommand::Flush(tx)).is_ok() {
            let _ = rx.await;
        }
    }

    /// Snapshot of the current profile.
    pub fn current(&self) -> Option<Profile> {
        self.current.borrow().clone()
    }

    /// Receiver that observes every change to the current profile.
    pub fn subscribe(&self) -> watch::Receiver<Option<Profile>> {
        self.current.subscribe()
    }

    /// Forget the current profile (sign-out). Queued writes still complete.
    pub fn clear(&self) {
        self.current.send_replace(None);
    }

    fn enqueue_save(&self, profile: Profile) {
        if self.commands.send(StoreCommand::Save(profile)).is_err() {
            warn!("profile writer is gone, change kept in memory only");
        }
    }
}

/// Combine a freshly loaded profile with the in-memory one.
///
/// For the same user the counter never goes down and premium is never
/// revoked: a send or upgrade made while the load was in flight wins.
fn merge_loaded(current: Option<Profile>, loaded: Option<Profile>) -> Option<Profile> {
    match (current, loaded) {
        (Some(current), Some(loaded)) if current.uid == loaded.uid => Some(Profile {
            message_count: loaded.message_count.max(current.message_count),
            is_premium: loaded.is_premium || current.is_premium,
            last_active_at: loaded.last_active_at.max(current.last_active_at),
            ..loaded
        }),
        (_, loaded) => loaded,
    }
}

async fn run_writer<R: ProfileRepository>(repo: R, mut rx: mpsc::UnboundedReceiver<StoreCommand>) {
    while let Some(command) = rx.recv().await {
        match command {
            StoreCommand::Save(profile) => {
                if let Err(e) = repo.save(&profile).await {
                    warn!(uid = %profile.uid, error = %e, "failed to persist profile");
                }
            }
            StoreCommand::Charge(uid) => {
                if let Err(e) = repo.increment_message_count(&uid).await {
                    warn!(%uid, error = %e, "failed to persist message charge");
                }
            }
            StoreCommand::Load { uid, reply } => {
                let loaded = match repo.get(&uid).await {
                    Ok(profile) => profile,
                    Err(e) => {
                        warn!(%uid, error = %e, "failed to load profile");
                        None
                    }
                };
                let _ = reply.send(loaded);
            }
            StoreCommand::Flush(reply) => {
                let _ = reply.send(());
            }
        }
    }
    debug!("profile writer stopped");
}
