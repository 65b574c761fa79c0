//! Parent dashboard handler.
//!
//! Endpoints:
//! - GET /api/v1/report - The guidance report; `403 PREMIUM_REQUIRED` for free profiles

use std::time::Instant;

use axum::extract::State;
use uuid::Uuid;

use rafway_core::report::{LOCKED_MESSAGE, ReportView, view_report};
use rafway_types::report::ReportData;

use super::profile::load_profile;
use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/report
pub async fn get_report(
    State(state): State<AppState>,
    auth: Authenticated,
) -> Result<ApiResponse<ReportData>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let (_, profile) = load_profile(&state, &auth.uid).await?;
    let report = match view_report(&profile, &state.report) {
        ReportView::Available(report) => report,
        ReportView::Locked => return Err(AppError::PremiumRequired(LOCKED_MESSAGE.to_string())),
    };

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(ApiResponse::success(report, request_id, elapsed).with_link("self", "/api/v1/report"))
}
