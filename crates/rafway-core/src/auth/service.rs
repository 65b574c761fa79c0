//! AuthService: get-or-create sign-in and bearer token lifecycle.

use tracing::{debug, info};

use rafway_types::error::{AuthError, RepositoryError};
use rafway_types::profile::{Profile, SignInRequest, UserId};

use super::repository::TokenRepository;
use super::token::TokenHasher;
use crate::profile::repository::ProfileRepository;

/// Issued on sign-in. The plaintext token is only ever returned here.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub token: String,
    pub profile: Profile,
    /// Whether this sign-in created the profile.
    pub created: bool,
}

pub struct AuthService<P: ProfileRepository, T: TokenRepository, H: TokenHasher> {
    profiles: P,
    tokens: T,
    hasher: H,
}

impl<P: ProfileRepository, T: TokenRepository, H: TokenHasher> AuthService<P, T, H> {
    pub fn new(profiles: P, tokens: T, hasher: H) -> Self {
        Self {
            profiles,
            tokens,
            hasher,
        }
    }

    /// Sign in, creating the profile with free-tier defaults on first access.
    ///
    /// With an email, an existing profile for that email is reused; without
    /// one, every sign-in is a new anonymous identity.
    pub async fn sign_in(&self, request: SignInRequest) -> Result<SignedIn, AuthError> {
        let email = request
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_lowercase);

        let existing = match &email {
            Some(email) => self.profiles.get_by_email(email).await?,
            None => None,
        };

        let (profile, created) = match existing {
            Some(profile) => (profile, false),
            None => {
                let profile = Profile::new(
                    UserId::new(),
                    email,
                    request.display_name.filter(|n| !n.trim().is_empty()),
                    request.photo_url,
                );
                match self.profiles.create(&profile).await {
                    Ok(profile) => {
                        info!(uid = %profile.uid, "profile created on first sign-in");
                        (profile, true)
                    }
                    // Lost a race with a concurrent first sign-in for the same email
                    Err(RepositoryError::Conflict(_)) if profile.email.is_some() => {
                        let email = profile.email.as_deref().unwrap_or_default();
                        let existing = self
                            .profiles
                            .get_by_email(email)
                            .await?
                            .ok_or_else(|| AuthError::StorageError("profile vanished".into()))?;
                        (existing, false)
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        };

        let token = self.hasher.generate();
        self.tokens
            .insert(&profile.uid, &self.hasher.hash(&token))
            .await?;
        debug!(uid = %profile.uid, created, "token issued");

        Ok(SignedIn {
            token,
            profile,
            created,
        })
    }

    /// Revoke a token. Unknown tokens are rejected.
    pub async fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        if self.tokens.revoke(&self.hasher.hash(token)).await? {
            debug!("token revoked");
            Ok(())
        } else {
            Err(AuthError::InvalidToken)
        }
    }

    /// Resolve a bearer token to its user.
    pub async fn authenticate(&self, token: &str) -> Result<UserId, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::Unauthenticated);
        }
        self.tokens
            .find_user(&self.hasher.hash(token))
            .await?
            .ok_or(AuthError::InvalidToken)
    }

    /// Resolve a bearer token to its user's stored profile.
    pub async fn current_profile(&self, token: &str) -> Result<Profile, AuthError> {
        let uid = self.authenticate(token).await?;
        self.profiles
            .get(&uid)
            .await?
            .ok_or(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryProfileRepository, InMemoryTokenRepository, PlainTokenHasher};

    fn service() -> AuthService<InMemoryProfileRepository, InMemoryTokenRepository, PlainTokenHasher>
    {
        AuthService::new(
            InMemoryProfileRepository::new(),
            InMemoryTokenRepository::new(),
            PlainTokenHasher::default(),
        )
    }

    fn request(email: Option<&str>) -> SignInRequest {
        SignInRequest {
            display_name: Some("Léa Martin".into()),
            email: email.map(String::from),
            photo_url: None,
        }
    }

    #[tokio::test]
    async fn test_first_sign_in_creates_free_profile() {
        let auth = service();
        let signed_in = auth.sign_in(request(Some("lea@example.com"))).await.unwrap();

        assert!(signed_in.created);
        assert!(!signed_in.profile.is_premium);
        assert_eq!(signed_in.profile.message_count, 0);
        assert_eq!(signed_in.profile.email.as_deref(), Some("lea@example.com"));
    }

    #[tokio::test]
    async fn test_sign_in_reuses_profile_by_email() {
        let auth = service();
        let first = auth.sign_in(request(Some("lea@example.com"))).await.unwrap();
        let second = auth.sign_in(request(Some(" LEA@example.com "))).await.unwrap();

        assert!(!second.created);
        assert_eq!(first.profile.uid, second.profile.uid);
        assert_ne!(first.token, second.token);
    }

    #[tokio::test]
    async fn test_anonymous_sign_ins_are_distinct() {
        let auth = service();
        let a = auth.sign_in(request(None)).await.unwrap();
        let b = auth.sign_in(request(None)).await.unwrap();
        assert_ne!(a.profile.uid, b.profile.uid);
    }

    #[tokio::test]
    async fn test_authenticate_and_revoke() {
        let auth = service();
        let signed_in = auth.sign_in(request(Some("lea@example.com"))).await.unwrap();

        let uid = auth.authenticate(&signed_in.token).await.unwrap();
        assert_eq!(uid, signed_in.profile.uid);

        auth.sign_out(&signed_in.token).await.unwrap();
        assert!(matches!(
            auth.authenticate(&signed_in.token).await,
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            auth.sign_out(&signed_in.token).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_empty_token_is_unauthenticated() {
        let auth = service();
        assert!(matches!(
            auth.authenticate("").await,
            Err(AuthError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_current_profile() {
        let auth = service();
        let signed_in = auth.sign_in(request(Some("lea@example.com"))).await.unwrap();
        let profile = auth.current_profile(&signed_in.token).await.unwrap();
        assert_eq!(profile.display_name.as_deref(), Some("Léa Martin"));
    }
}
