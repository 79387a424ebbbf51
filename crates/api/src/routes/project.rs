//! Route definitions for projects and reviewer assignments.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::{mockup, project};
use crate::state::AppState;

/// Project routes, merged into `/projects`.
///
/// ```text
/// GET    /                                  list_projects
/// POST   /                                  create_project
/// GET    /{project_id}                      get_project
/// GET    /{project_id}/reviewers            list_reviewers
/// POST   /{project_id}/reviewers            assign_reviewer     (admin)
/// DELETE /{project_id}/reviewers/{user_id}  remove_reviewer     (admin)
/// GET    /{project_id}/mockups              list project mockups
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(project::list_projects).post(project::create_project),
        )
        .route("/{project_id}", get(project::get_project))
        .route(
            "/{project_id}/reviewers",
            get(project::list_reviewers).post(project::assign_reviewer),
        )
        .route(
            "/{project_id}/reviewers/{user_id}",
            delete(project::remove_reviewer),
        )
        .route("/{project_id}/mockups", get(mockup::list_for_project))
}
