//! Route definitions for mockups and their review lifecycle.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{mockup, review};
use crate::state::AppState;

/// Mockup routes, merged into `/mockups`.
///
/// ```text
/// POST   /                                            create_mockup
/// GET    /{mockup_id}                                 get_mockup
/// POST   /{mockup_id}/start-review                    start_review
/// POST   /{mockup_id}/resubmit                        resubmit
/// GET    /{mockup_id}/progress                        get_progress
/// GET    /{mockup_id}/progress/history                get_progress_history
/// GET    /{mockup_id}/timeline                        get_timeline
/// POST   /{mockup_id}/final-approval                  grant_final_approval
/// POST   /{mockup_id}/stages/{order}/approve          approve_stage
/// POST   /{mockup_id}/stages/{order}/request-changes  request_changes
/// GET    /{mockup_id}/stages/{order}/decisions        list_stage_decisions
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(mockup::create_mockup))
        .route("/{mockup_id}", get(mockup::get_mockup))
        .route("/{mockup_id}/start-review", post(mockup::start_review))
        .route("/{mockup_id}/resubmit", post(mockup::resubmit))
        .route("/{mockup_id}/progress", get(review::get_progress))
        .route(
            "/{mockup_id}/progress/history",
            get(review::get_progress_history),
        )
        .route("/{mockup_id}/timeline", get(review::get_timeline))
        .route(
            "/{mockup_id}/final-approval",
            post(review::grant_final_approval),
        )
        .route(
            "/{mockup_id}/stages/{stage_order}/approve",
            post(review::approve_stage),
        )
        .route(
            "/{mockup_id}/stages/{stage_order}/request-changes",
            post(review::request_changes),
        )
        .route(
            "/{mockup_id}/stages/{stage_order}/decisions",
            get(review::list_stage_decisions),
        )
}
