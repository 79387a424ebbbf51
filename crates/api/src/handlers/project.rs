//! Handlers for project management and reviewer assignment.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use mockdeck_core::error::CoreError;
use mockdeck_core::types::DbId;
use mockdeck_db::models::project::CreateProject;
use mockdeck_db::models::reviewer::CreateAssignment;
use mockdeck_db::repositories::{ProjectRepo, ReviewerRepo, WorkflowRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireDesigner};
use crate::response::{created, DataResponse};
use crate::state::AppState;

/// POST /api/v1/projects
///
/// Create a project, optionally bound to a workflow definition. A project
/// without a workflow skips stage review entirely: its mockups go straight
/// to the final-approval gate.
pub async fn create_project(
    RequireDesigner(user): RequireDesigner,
    State(state): State<AppState>,
    Json(input): Json<CreateProject>,
) -> AppResult<impl IntoResponse> {
    if let Some(workflow_id) = input.workflow_id {
        let workflow = WorkflowRepo::find_by_id(&state.pool, workflow_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Workflow",
                id: workflow_id,
            }))?;
        if workflow.org_id != user.org_id {
            return Err(AppError::Core(CoreError::Forbidden(
                "Workflow belongs to a different organization".into(),
            )));
        }
        if workflow.is_archived {
            return Err(AppError::Core(CoreError::Conflict(
                "Cannot attach an archived workflow to a new project".into(),
            )));
        }
    }

    let project = ProjectRepo::create(&state.pool, user.org_id, user.user_id, &input).await?;

    tracing::info!(
        project_id = project.id,
        user_id = user.user_id,
        workflow_id = ?project.workflow_id,
        "Project created"
    );

    Ok(created(project))
}

/// GET /api/v1/projects
///
/// List the caller's organization's projects.
pub async fn list_projects(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let projects = ProjectRepo::list_for_org(&state.pool, auth.org_id).await?;
    Ok(DataResponse::new(projects))
}

/// GET /api/v1/projects/{project_id}
pub async fn get_project(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let project = ProjectRepo::find_by_id(&state.pool, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))?;
    Ok(DataResponse::new(project))
}

/// POST /api/v1/projects/{project_id}/reviewers
///
/// Assign a reviewer to the project (all stages) or to one stage. Admin
/// only. Quorums already snapshotted by in-progress stages are unaffected.
pub async fn assign_reviewer(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateAssignment>,
) -> AppResult<impl IntoResponse> {
    ensure_project_exists(&state, project_id).await?;

    let assignment = ReviewerRepo::assign(&state.pool, project_id, &input).await?;

    tracing::info!(
        project_id,
        reviewer_id = input.user_id,
        stage_order = ?input.stage_order,
        admin_id = user.user_id,
        "Reviewer assigned"
    );

    Ok(created(assignment))
}

/// Query parameters for reviewer removal.
#[derive(Debug, Deserialize)]
pub struct RemoveAssignmentQuery {
    pub stage_order: Option<i32>,
}

/// DELETE /api/v1/projects/{project_id}/reviewers/{user_id}
///
/// Remove a reviewer assignment. Admin only.
pub async fn remove_reviewer(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, user_id)): Path<(DbId, DbId)>,
    Query(query): Query<RemoveAssignmentQuery>,
) -> AppResult<impl IntoResponse> {
    ensure_project_exists(&state, project_id).await?;

    let removed =
        ReviewerRepo::remove(&state.pool, project_id, user_id, query.stage_order).await?;
    if !removed {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "ReviewerAssignment",
            id: user_id,
        }));
    }

    tracing::info!(
        project_id,
        reviewer_id = user_id,
        admin_id = admin.user_id,
        "Reviewer assignment removed"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/projects/{project_id}/reviewers
///
/// List all reviewer assignments for a project.
pub async fn list_reviewers(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_project_exists(&state, project_id).await?;
    let assignments = ReviewerRepo::list_for_project(&state.pool, project_id).await?;
    Ok(DataResponse::new(assignments))
}

async fn ensure_project_exists(state: &AppState, project_id: DbId) -> AppResult<()> {
    ProjectRepo::find_by_id(&state.pool, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))?;
    Ok(())
}
