//! Profile and upgrade handlers.
//!
//! Endpoints:
//! - GET  /api/v1/profile         - Current profile and quota
//! - POST /api/v1/profile/upgrade - Simulated premium upgrade

use std::time::Instant;

use axum::extract::State;
use serde::Serialize;
use uuid::Uuid;

use rafway_core::profile::store::SessionStore;
use rafway_core::profile::upgrade::{UPGRADE_CONFIRMATION, upgrade_current};
use rafway_core::quota;
use rafway_types::profile::{Profile, UserId};

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub profile: Profile,
    pub can_send: bool,
    /// `None` for premium profiles.
    pub remaining_free_messages: Option<u32>,
}

impl From<Profile> for ProfileView {
    fn from(profile: Profile) -> Self {
        Self {
            can_send: quota::allowed(&profile),
            remaining_free_messages: quota::remaining_free_messages(&profile),
            profile,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpgradeResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub view: ProfileView,
}

/// The caller's shared store and its freshly loaded profile.
pub(crate) async fn load_profile(
    state: &AppState,
    uid: &UserId,
) -> Result<(SessionStore, Profile), AppError> {
    let store = state.profile_store(uid).await;
    let profile = store
        .current()
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
    Ok((store, profile))
}

/// GET /api/v1/profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth: Authenticated,
) -> Result<ApiResponse<ProfileView>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let (_, profile) = load_profile(&state, &auth.uid).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let mut resp = ApiResponse::success(ProfileView::from(profile), request_id, elapsed)
        .with_link("self", "/api/v1/profile")
        .with_link("report", "/api/v1/report");
    if !resp.data.profile.is_premium {
        resp = resp.with_link("upgrade", "/api/v1/profile/upgrade");
    }
    Ok(resp)
}

/// POST /api/v1/profile/upgrade
///
/// Goes through the shared store so open sessions observe the upgrade and
/// leave the paywall. Idempotent.
pub async fn upgrade(
    State(state): State<AppState>,
    auth: Authenticated,
) -> Result<ApiResponse<UpgradeResponse>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let (store, _) = load_profile(&state, &auth.uid).await?;
    let upgraded = upgrade_current(&store)
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
    store.flush().await;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(ApiResponse::success(
        UpgradeResponse {
            message: UPGRADE_CONFIRMATION,
            view: ProfileView::from(upgraded),
        },
        request_id,
        elapsed,
    )
    .with_link("report", "/api/v1/report"))
}
