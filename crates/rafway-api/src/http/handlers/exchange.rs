//! Server-side chat exchange handlers.
//!
//! Endpoints:
//! - POST /api/v1/chat/exchange  - One question, one answer, charged on success
//! - GET  /api/v1/chat/exchanges - The caller's logged exchanges, newest first

use std::time::Instant;

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use uuid::Uuid;

use rafway_core::chat::exchange::ExchangeOutcome;
use rafway_core::chat::repository::ChatLogRepository;
use rafway_types::chat::{ChatExchange, HistoryEntry};

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExchangeRequest {
    pub text: String,
    /// Prior turns, oldest first.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ExchangeListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

/// POST /api/v1/chat/exchange
///
/// Running out of free messages is a normal `quota_exceeded` outcome, not an error.
pub async fn exchange(
    State(state): State<AppState>,
    auth: Authenticated,
    Json(request): Json<ExchangeRequest>,
) -> Result<ApiResponse<ExchangeOutcome>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let outcome = state
        .exchange_service
        .exchange(&auth.uid, &request.text, &request.history, &state.provider)
        .await?;

    // Open sessions share the quota; refresh their view of the counter
    if matches!(outcome, ExchangeOutcome::Replied { .. }) {
        let store = state.profile_stores.get(&auth.uid).map(|s| s.clone());
        if let Some(store) = store {
            store.load(&auth.uid).await;
        }
    }

    let elapsed = start.elapsed().as_millis() as u64;
    let mut resp = ApiResponse::success(outcome, request_id, elapsed)
        .with_link("history", "/api/v1/chat/exchanges");
    if matches!(resp.data, ExchangeOutcome::QuotaExceeded { .. }) {
        resp = resp.with_link("upgrade", "/api/v1/profile/upgrade");
    }
    Ok(resp)
}

/// GET /api/v1/chat/exchanges
pub async fn list_exchanges(
    State(state): State<AppState>,
    auth: Authenticated,
    Query(query): Query<ExchangeListQuery>,
) -> Result<ApiResponse<Vec<ChatExchange>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    if !(1..=500).contains(&query.limit) {
        return Err(AppError::Validation(
            "limit must be between 1 and 500".to_string(),
        ));
    }

    let exchanges = state
        .chat_log
        .list_exchanges(&auth.uid, query.limit)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(ApiResponse::success(exchanges, request_id, elapsed)
        .with_link("self", "/api/v1/chat/exchanges"))
}
