//! Route definitions for the `/api/v1` tree.

pub mod auth;
pub mod health;
pub mod mockup;
pub mod notification;
pub mod project;
pub mod workflow;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      login (public)
///
/// /workflows                                       list, create (create: admin)
/// /workflows/{id}                                  get, update (admin)
/// /workflows/{id}/archive                          archive (admin)
///
/// /projects                                        list, create
/// /projects/{id}                                   get
/// /projects/{id}/reviewers                         list, assign (admin)
/// /projects/{id}/reviewers/{user_id}               remove (admin)
/// /projects/{id}/mockups                           list project mockups
///
/// /mockups                                         create
/// /mockups/{id}                                    get
/// /mockups/{id}/start-review                       enter the review workflow
/// /mockups/{id}/resubmit                           reopen after changes
/// /mockups/{id}/progress                           derived review state
/// /mockups/{id}/progress/history                   full stage ledger
/// /mockups/{id}/timeline                           archived review events
/// /mockups/{id}/final-approval                     terminal gate
/// /mockups/{id}/stages/{order}/approve             record approval
/// /mockups/{id}/stages/{order}/request-changes     record changes request
/// /mockups/{id}/stages/{order}/decisions           stage decision audit list
///
/// /notifications                                   list
/// /notifications/unread-count                      unread counter
/// /notifications/read-all                          mark all read
/// /notifications/{id}/read                         mark one read
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/workflows", workflow::router())
        .nest("/projects", project::router())
        .nest("/mockups", mockup::router())
        .nest("/notifications", notification::router())
}
