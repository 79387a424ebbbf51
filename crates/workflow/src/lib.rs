//! Multi-stage approval workflow engine.
//!
//! This crate moves a mockup through its project's ordered review stages:
//!
//! - [`recorder`] — records one reviewer decision per (mockup, stage,
//!   reviewer), idempotently, inside a serialized critical section.
//! - [`coordinator`] — decides whether a stage is complete, advances the
//!   mockup, cascades through zero-quorum stages, and handles review start
//!   and resubmission.
//! - [`final_approval`] — the one-way terminal gate reserved for the project
//!   creator or an organization admin.
//! - [`fanout`] — best-effort notification fan-out after each transition;
//!   its failures never roll back a transition.
//! - [`progress`] — the derived "current review state" view.
//!
//! All operations hang off [`ApprovalEngine`], which owns the database pool
//! and the event bus handle.

pub mod coordinator;
pub mod error;
pub mod fanout;
pub mod final_approval;
pub mod progress;
pub mod recorder;

use std::sync::Arc;

use mockdeck_db::DbPool;
use mockdeck_events::ReviewEventBus;

pub use error::EngineError;
pub use progress::ReviewState;
pub use recorder::DecisionOutcome;

/// The approval workflow engine.
///
/// Cheap to clone; handlers construct it once in application state and call
/// its methods per request. All stage mutations are serialized per
/// (mockup, stage) through row locks taken inside each method's transaction.
#[derive(Clone)]
pub struct ApprovalEngine {
    pub(crate) pool: DbPool,
    pub(crate) bus: Arc<ReviewEventBus>,
}

impl ApprovalEngine {
    /// Create an engine sharing the given pool and review event bus.
    pub fn new(pool: DbPool, bus: Arc<ReviewEventBus>) -> Self {
        Self { pool, bus }
    }
}
