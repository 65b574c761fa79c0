//! Sign-in and sign-out handlers.
//!
//! Endpoints:
//! - POST /api/v1/auth/sign-in  - Get-or-create a profile and issue a token
//! - POST /api/v1/auth/sign-out - Revoke the caller's token and close their sessions

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use uuid::Uuid;

use rafway_types::profile::{Profile, SignInRequest};

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    /// Shown once. Send it back as `Authorization: Bearer <token>`.
    pub token: String,
    pub profile: Profile,
    pub created: bool,
}

#[derive(Debug, Serialize)]
pub struct SignOutResponse {
    pub sessions_closed: usize,
}

/// POST /api/v1/auth/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> Result<ApiResponse<SignInResponse>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let signed_in = state.auth_service.sign_in(request).await?;
    let created = signed_in.created;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(
        SignInResponse {
            token: signed_in.token,
            profile: signed_in.profile,
            created,
        },
        request_id,
        elapsed,
    )
    .with_link("profile", "/api/v1/profile")
    .with_link("sessions", "/api/v1/sessions");

    Ok(if created { resp.created() } else { resp })
}

/// POST /api/v1/auth/sign-out
///
/// Open sessions are closed first, so in-flight replies are dropped.
pub async fn sign_out(
    State(state): State<AppState>,
    auth: Authenticated,
) -> Result<ApiResponse<SignOutResponse>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sessions_closed = state.sessions.remove_all_for(&auth.uid);
    state.forget_profile_store(&auth.uid);
    state.auth_service.sign_out(&auth.token).await?;
    tracing::info!(uid = %auth.uid, sessions_closed, "signed out");

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(ApiResponse::success(
        SignOutResponse { sessions_closed },
        request_id,
        elapsed,
    ))
}
