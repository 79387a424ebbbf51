//! Handlers for workflow definition management.
//!
//! Workflows are admin-managed. Stage lists are validated in
//! `mockdeck_core::workflow` before touching storage; edits are checked
//! against in-progress ledgers so history is never rewritten.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use mockdeck_core::error::CoreError;
use mockdeck_core::types::DbId;
use mockdeck_core::workflow::{
    validate_stage_edit, validate_stages, validate_workflow_name, StageSpec,
};
use mockdeck_db::models::workflow::{CreateWorkflow, StageInput, UpdateWorkflow};
use mockdeck_db::repositories::{StageProgressRepo, WorkflowRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::{created, DataResponse};
use crate::state::AppState;

fn to_specs(stages: &[StageInput]) -> Vec<StageSpec> {
    stages
        .iter()
        .map(|s| StageSpec {
            stage_order: s.stage_order,
            name: s.name.clone(),
            color: s.color.clone(),
        })
        .collect()
}

/// POST /api/v1/workflows
///
/// Create a workflow definition with its ordered stage list. Admin only.
pub async fn create_workflow(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateWorkflow>,
) -> AppResult<impl IntoResponse> {
    validate_workflow_name(&input.name)?;
    validate_stages(&to_specs(&input.stages))?;

    let workflow = WorkflowRepo::create(
        &state.pool,
        user.org_id,
        user.user_id,
        &input.name,
        &input.stages,
    )
    .await?;

    tracing::info!(
        workflow_id = workflow.workflow.id,
        user_id = user.user_id,
        stages = workflow.stages.len(),
        "Workflow created"
    );

    Ok(created(workflow))
}

/// GET /api/v1/workflows
///
/// List the caller's organization's unarchived workflows.
pub async fn list_workflows(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let workflows = WorkflowRepo::list_for_org(&state.pool, auth.org_id).await?;
    Ok(DataResponse::new(workflows))
}

/// GET /api/v1/workflows/{workflow_id}
///
/// Fetch a workflow with its stage list.
pub async fn get_workflow(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(workflow_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let workflow = WorkflowRepo::find_with_stages(&state.pool, workflow_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Workflow",
            id: workflow_id,
        }))?;
    Ok(DataResponse::new(workflow))
}

/// PUT /api/v1/workflows/{workflow_id}
///
/// Update a workflow's name and/or replace its stage list. Admin only.
/// Stage removals or reorders are rejected once any in-progress review
/// references the definition; appending stages is always allowed.
pub async fn update_workflow(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(workflow_id): Path<DbId>,
    Json(input): Json<UpdateWorkflow>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = &input.name {
        validate_workflow_name(name)?;
    }
    if let Some(stages) = &input.stages {
        let highest = StageProgressRepo::max_referenced_order(&state.pool, workflow_id).await?;
        validate_stage_edit(&to_specs(stages), highest)?;
    }

    let workflow = WorkflowRepo::update(
        &state.pool,
        workflow_id,
        input.name.as_deref(),
        input.stages.as_deref(),
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Workflow",
        id: workflow_id,
    }))?;

    tracing::info!(workflow_id, user_id = user.user_id, "Workflow updated");

    Ok(DataResponse::new(workflow))
}

/// POST /api/v1/workflows/{workflow_id}/archive
///
/// Hide a workflow from new projects. Existing reviews are unaffected.
/// Admin only.
pub async fn archive_workflow(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(workflow_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let archived = WorkflowRepo::archive(&state.pool, workflow_id).await?;
    if !archived {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Workflow",
            id: workflow_id,
        }));
    }

    tracing::info!(workflow_id, user_id = user.user_id, "Workflow archived");

    Ok(StatusCode::NO_CONTENT)
}
