//! Route definitions for workflow management.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::workflow;
use crate::state::AppState;

/// Workflow routes, merged into `/workflows`.
///
/// ```text
/// GET    /                         list_workflows
/// POST   /                         create_workflow      (admin)
/// GET    /{workflow_id}            get_workflow
/// PUT    /{workflow_id}            update_workflow      (admin)
/// POST   /{workflow_id}/archive    archive_workflow     (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(workflow::list_workflows).post(workflow::create_workflow),
        )
        .route(
            "/{workflow_id}",
            get(workflow::get_workflow).put(workflow::update_workflow),
        )
        .route("/{workflow_id}/archive", post(workflow::archive_workflow))
}
