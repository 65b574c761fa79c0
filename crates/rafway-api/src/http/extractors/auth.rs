//! Bearer token authentication extractor.
//!
//! Extracts the token issued at sign-in from:
//! - `Authorization: Bearer <token>` header
//! - `X-API-Key: <token>` header
//!
//! Tokens are verified through `AuthService`, which compares SHA-256 hashes
//! against the `auth_tokens` table.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use rafway_types::error::AuthError;
use rafway_types::profile::UserId;

use crate::http::error::AppError;
use crate::state::AppState;

/// The signed-in caller. Extracting this validates the token.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub uid: UserId,
    pub token: String,
}

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts)?.ok_or(AuthError::Unauthenticated)?;
        let uid = state.auth_service.authenticate(&token).await?;
        Ok(Authenticated { uid, token })
    }
}

/// Extract the token from request headers. `None` when neither header is set.
fn extract_token(parts: &Parts) -> Result<Option<String>, AppError> {
    if let Some(auth) = parts.headers.get("authorization") {
        let auth_str = auth.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid Authorization header encoding".to_string())
        })?;
        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            return Ok(Some(token.trim().to_string()));
        }
    }

    if let Some(key) = parts.headers.get("x-api-key") {
        let key_str = key.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid X-API-Key header encoding".to_string())
        })?;
        return Ok(Some(key_str.trim().to_string()));
    }

    Ok(None)
}
