use std::sync::Arc;

use mockdeck_workflow::ApprovalEngine;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: mockdeck_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Bus carrying review events to the archiver and delivery worker.
    pub event_bus: Arc<mockdeck_events::ReviewEventBus>,
    /// The approval workflow engine.
    pub engine: ApprovalEngine,
}
