//! Handlers for mockup management and review lifecycle actions.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use mockdeck_core::error::CoreError;
use mockdeck_core::types::DbId;
use mockdeck_db::models::mockup::CreateMockup;
use mockdeck_db::repositories::MockupRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireDesigner;
use crate::response::{created, DataResponse};
use crate::state::AppState;

/// POST /api/v1/mockups
///
/// Create a mockup, optionally under a project.
pub async fn create_mockup(
    RequireDesigner(user): RequireDesigner,
    State(state): State<AppState>,
    Json(input): Json<CreateMockup>,
) -> AppResult<impl IntoResponse> {
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Mockup title must not be empty".into(),
        )));
    }

    let mockup = MockupRepo::create(&state.pool, user.org_id, user.user_id, &input).await?;

    tracing::info!(
        mockup_id = mockup.id,
        user_id = user.user_id,
        project_id = ?mockup.project_id,
        "Mockup created"
    );

    Ok(created(mockup))
}

/// GET /api/v1/mockups/{mockup_id}
pub async fn get_mockup(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(mockup_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let mockup = MockupRepo::find_by_id(&state.pool, mockup_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Mockup",
            id: mockup_id,
        }))?;
    Ok(DataResponse::new(mockup))
}

/// GET /api/v1/projects/{project_id}/mockups
pub async fn list_for_project(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let mockups = MockupRepo::list_for_project(&state.pool, project_id).await?;
    Ok(DataResponse::new(mockups))
}

/// POST /api/v1/mockups/{mockup_id}/start-review
///
/// Move the mockup into its project's review workflow.
pub async fn start_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(mockup_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let review = state.engine.start_review(mockup_id, auth.user_id).await?;
    Ok(created(review))
}

/// POST /api/v1/mockups/{mockup_id}/resubmit
///
/// Resubmit after a changes request; the current stage re-opens for a fresh
/// round of review.
pub async fn resubmit(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(mockup_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let progress = state.engine.resubmit(mockup_id, auth.user_id).await?;
    Ok(DataResponse::new(progress))
}
