//! Interactive chat session handlers.
//!
//! Endpoints:
//! - POST   /api/v1/sessions               - Open a session (greeting included)
//! - GET    /api/v1/sessions/{id}          - Transcript and state
//! - DELETE /api/v1/sessions/{id}          - Close; an in-flight reply is dropped
//! - POST   /api/v1/sessions/{id}/messages - Submit a message and wait for Raf
//!
//! Sessions live in memory only. The per-session lock is held to begin and to
//! complete a submit, never while generation runs.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rafway_core::chat::prompt::PAYWALL_MESSAGE;
use rafway_core::chat::session::{ChatSession, SessionSnapshot, SubmitOutcome};
use rafway_types::chat::ChatMessage;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub text: String,
}

/// What happened to a submitted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitStatus {
    /// Empty text or a reply already pending. Nothing changed.
    Ignored,
    /// Free quota spent. Nothing was sent or charged.
    Blocked,
    Replied,
    /// The session was closed while Raf was answering.
    Cancelled,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub status: SubmitStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paywall: Option<&'static str>,
    pub session: SessionSnapshot,
}

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid UUID: {s}")))
}

fn session_not_found(id: &Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}

fn session_links<T: Serialize>(resp: ApiResponse<T>, id: &Uuid) -> ApiResponse<T> {
    resp.with_link("self", &format!("/api/v1/sessions/{id}"))
        .with_link("messages", &format!("/api/v1/sessions/{id}/messages"))
}

/// POST /api/v1/sessions
pub async fn create_session(
    State(state): State<AppState>,
    auth: Authenticated,
) -> Result<ApiResponse<SessionSnapshot>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let store = state.profile_store(&auth.uid).await;
    if store.current().is_none() {
        return Err(AppError::NotFound("Profile not found".to_string()));
    }

    let session = ChatSession::new(store, state.prompt_options());
    let snapshot = session.snapshot();
    let id = state.sessions.insert(auth.uid.clone(), session);
    tracing::info!(uid = %auth.uid, session_id = %id, state = %snapshot.state, "session opened");

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(session_links(ApiResponse::success(snapshot, request_id, elapsed), &id).created())
}

/// GET /api/v1/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(session_id): Path<String>,
) -> Result<ApiResponse<SessionSnapshot>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = parse_uuid(&session_id)?;
    let session = state
        .sessions
        .get(&id, &auth.uid)
        .ok_or_else(|| session_not_found(&id))?;

    // Pick up upgrades or charges made elsewhere
    state.profile_store(&auth.uid).await;
    let snapshot = {
        let mut session = session.lock().await;
        session.sync_profile();
        session.snapshot()
    };

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(session_links(ApiResponse::success(snapshot, request_id, elapsed), &id))
}

/// DELETE /api/v1/sessions/{id}
pub async fn delete_session(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(session_id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = parse_uuid(&session_id)?;
    if !state.sessions.remove(&id, &auth.uid) {
        return Err(session_not_found(&id));
    }

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(ApiResponse::success(
        serde_json::json!({ "closed": id }),
        request_id,
        elapsed,
    ))
}

/// POST /api/v1/sessions/{id}/messages
pub async fn submit_message(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(session_id): Path<String>,
    Json(body): Json<SubmitRequest>,
) -> Result<ApiResponse<SubmitResponse>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = parse_uuid(&session_id)?;
    let session = state
        .sessions
        .get(&id, &auth.uid)
        .ok_or_else(|| session_not_found(&id))?;

    let outcome = session.lock().await.begin_submit(&body.text);

    let (status, reply) = match outcome {
        SubmitOutcome::Ignored => (SubmitStatus::Ignored, None),
        SubmitOutcome::Blocked => (SubmitStatus::Blocked, None),
        SubmitOutcome::SignedOut => {
            return Err(AppError::NotFound("Profile not found".to_string()));
        }
        SubmitOutcome::Accepted(pending) => {
            let result = pending.resolve(&state.provider).await;
            let mut session = session.lock().await;
            match result {
                Some(result) => (
                    SubmitStatus::Replied,
                    session.complete_submit(result).cloned(),
                ),
                None => {
                    session.abandon_submit();
                    (SubmitStatus::Cancelled, None)
                }
            }
        }
    };

    let snapshot = session.lock().await.snapshot();
    let paywall = (snapshot.state == rafway_types::chat::SessionState::PaywallBlocked)
        .then_some(PAYWALL_MESSAGE);

    let elapsed = start.elapsed().as_millis() as u64;
    let mut resp = session_links(
        ApiResponse::success(
            SubmitResponse {
                status,
                reply,
                paywall,
                session: snapshot,
            },
            request_id,
            elapsed,
        ),
        &id,
    );
    if paywall.is_some() {
        resp = resp.with_link("upgrade", "/api/v1/profile/upgrade");
    }
    Ok(resp)
}
