//! Free-tier message quota.
//!
//! A free profile may send `FREE_LIMIT` messages; premium profiles are
//! never limited. The gate only reads the profile.

use rafway_types::profile::Profile;

/// Number of messages a free profile may send.
pub const FREE_LIMIT: u32 = 5;

/// Whether the profile may send another message.
///
/// The limit is exclusive: once `message_count` reaches `FREE_LIMIT`,
/// further messages are refused.
pub fn allowed(profile: &Profile) -> bool {
    profile.is_premium || profile.message_count < FREE_LIMIT
}

/// Free messages left, or `None` for premium profiles.
pub fn remaining_free_messages(profile: &Profile) -> Option<u32> {
    if profile.is_premium {
        None
    } else {
        Some(FREE_LIMIT.saturating_sub(profile.message_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rafway_types::profile::UserId;

    fn profile(is_premium: bool, message_count: u32) -> Profile {
        let mut p = Profile::new(UserId::new(), None, None, None);
        p.is_premium = is_premium;
        p.message_count = message_count;
        p
    }

    #[test]
    fn test_free_profile_allowed_below_limit() {
        for count in 0..=20 {
            assert_eq!(allowed(&profile(false, count)), count < 5, "count = {count}");
        }
    }

    #[test]
    fn test_premium_always_allowed() {
        for count in [0, 4, 5, 6, 1_000, u32::MAX] {
            assert!(allowed(&profile(true, count)));
        }
    }

    #[test]
    fn test_boundary_is_exclusive() {
        assert!(allowed(&profile(false, 4)));
        assert!(!allowed(&profile(false, 5)));
    }

    #[test]
    fn test_remaining_free_messages() {
        assert_eq!(remaining_free_messages(&profile(false, 0)), Some(5));
        assert_eq!(remaining_free_messages(&profile(false, 3)), Some(2));
        assert_eq!(remaining_free_messages(&profile(false, 5)), Some(0));
        assert_eq!(remaining_free_messages(&profile(false, 9)), Some(0));
        assert_eq!(remaining_free_messages(&profile(true, 9)), None);
    }
}
