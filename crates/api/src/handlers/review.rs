//! Handlers for the stage review workflow.
//!
//! Thin wrappers over the approval engine: decision recording, the
//! final-approval gate, and the derived progress views. All quorum and
//! transition logic lives in `mockdeck-workflow`.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use mockdeck_core::decision::{DECISION_APPROVE, DECISION_REQUEST_CHANGES};
use mockdeck_core::types::DbId;
use mockdeck_db::models::decision::{ApproveRequest, RequestChangesRequest};
use mockdeck_db::repositories::{DecisionRepo, ReviewEventRepo};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::{created, DataResponse};
use crate::state::AppState;

/// Most timeline entries one request will return.
const TIMELINE_LIMIT: i64 = 200;

/// POST /api/v1/mockups/{mockup_id}/stages/{stage_order}/approve
///
/// Record an approval from the authenticated reviewer. Repeating the same
/// decision is a successful no-op.
pub async fn approve_stage(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((mockup_id, stage_order)): Path<(DbId, i32)>,
    Json(input): Json<ApproveRequest>,
) -> AppResult<impl IntoResponse> {
    let outcome = state
        .engine
        .record_decision(mockup_id, stage_order, auth.user_id, DECISION_APPROVE, input.note)
        .await?;

    Ok(created(outcome))
}

/// POST /api/v1/mockups/{mockup_id}/stages/{stage_order}/request-changes
///
/// Send the mockup back to its creator. The stage's approval counter resets
/// and the creator must resubmit before review continues.
pub async fn request_changes(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((mockup_id, stage_order)): Path<(DbId, i32)>,
    Json(input): Json<RequestChangesRequest>,
) -> AppResult<impl IntoResponse> {
    let outcome = state
        .engine
        .record_decision(
            mockup_id,
            stage_order,
            auth.user_id,
            DECISION_REQUEST_CHANGES,
            input.note,
        )
        .await?;

    Ok(created(outcome))
}

/// Request body for the final-approval endpoint.
#[derive(Debug, Deserialize)]
pub struct FinalApprovalRequest {
    pub note: Option<String>,
}

/// POST /api/v1/mockups/{mockup_id}/final-approval
///
/// Pass the terminal gate. Restricted to the project creator or an
/// organization admin; a second call fails with 409.
pub async fn grant_final_approval(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(mockup_id): Path<DbId>,
    Json(input): Json<FinalApprovalRequest>,
) -> AppResult<impl IntoResponse> {
    let mockup = state
        .engine
        .grant_final_approval(mockup_id, auth.user_id, input.note)
        .await?;

    Ok(DataResponse::new(mockup))
}

/// GET /api/v1/mockups/{mockup_id}/progress
///
/// The mockup's derived current review state.
pub async fn get_progress(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(mockup_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let review = state.engine.current_progress(mockup_id).await?;
    Ok(DataResponse::new(review))
}

/// GET /api/v1/mockups/{mockup_id}/progress/history
///
/// The full stage ledger for the mockup, in stage order.
pub async fn get_progress_history(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(mockup_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let history = state.engine.progress_history(mockup_id).await?;
    Ok(DataResponse::new(history))
}

/// GET /api/v1/mockups/{mockup_id}/timeline
///
/// The archived review events for the mockup, oldest first.
pub async fn get_timeline(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(mockup_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let timeline =
        ReviewEventRepo::timeline_for_mockup(&state.pool, mockup_id, TIMELINE_LIMIT).await?;
    Ok(DataResponse::new(timeline))
}

/// GET /api/v1/mockups/{mockup_id}/stages/{stage_order}/decisions
///
/// All decisions recorded for a stage, newest first (audit view).
pub async fn list_stage_decisions(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path((mockup_id, stage_order)): Path<(DbId, i32)>,
) -> AppResult<impl IntoResponse> {
    let decisions = DecisionRepo::list_for_stage(&state.pool, mockup_id, stage_order).await?;
    Ok(DataResponse::new(decisions))
}
