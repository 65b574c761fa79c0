//! Simulated premium upgrade.
//!
//! There is no payment step: confirming the upgrade flips `is_premium`.
//! Upgrading never touches `message_count`.

use tracing::info;

use rafway_types::profile::Profile;

use super::store::SessionStore;

/// Confirmation text shown after a successful upgrade.
pub const UPGRADE_CONFIRMATION: &str =
    "Simulation : Paiement réussi ! Bienvenue dans Raf Way Premium.";

/// Return `profile` with premium granted. Idempotent.
pub fn upgrade(profile: &Profile) -> Profile {
    Profile {
        is_premium: true,
        ..profile.clone()
    }
}

/// Upgrade the store's current profile and queue the write.
///
/// Returns `None` when nobody is signed in.
pub fn upgrade_current(store: &SessionStore) -> Option<Profile> {
    let upgraded = store.update(|profile| profile.is_premium = true)?;
    info!(uid = %upgraded.uid, "profile upgraded to premium");
    Some(upgraded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quota;
    use crate::testing::InMemoryProfileRepository;
    use rafway_types::profile::UserId;

    #[test]
    fn test_upgrade_sets_premium_only() {
        let mut profile = Profile::new(UserId::new(), None, Some("Léa".into()), None);
        profile.message_count = 5;

        let upgraded = upgrade(&profile);
        assert!(upgraded.is_premium);
        assert_eq!(upgraded.message_count, 5);
        assert_eq!(upgraded.uid, profile.uid);
        assert_eq!(upgraded.display_name, profile.display_name);
        assert!(quota::allowed(&upgraded));
    }

    #[test]
    fn test_upgrade_is_idempotent() {
        let profile = Profile::new(UserId::new(), None, None, None);
        let once = upgrade(&profile);
        assert_eq!(upgrade(&once), once);
    }

    #[tokio::test]
    async fn test_upgrade_current_persists() {
        let repo = InMemoryProfileRepository::new();
        let mut profile = Profile::new(UserId::new(), None, None, None);
        profile.message_count = 5;
        repo.insert(profile.clone());

        let store = SessionStore::spawn(repo.clone());
        store.load(&profile.uid).await;
        let upgraded = upgrade_current(&store).unwrap();
        assert!(upgraded.is_premium);
        assert_eq!(upgraded.message_count, 5);

        store.flush().await;
        assert!(repo.get_sync(&profile.uid).unwrap().is_premium);
    }

    #[tokio::test]
    async fn test_upgrade_current_signed_out() {
        let store = SessionStore::spawn(InMemoryProfileRepository::new());
        assert!(upgrade_current(&store).is_none());
    }
}
