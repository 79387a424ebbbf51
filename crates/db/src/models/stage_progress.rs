//! Stage progress ledger models and DTOs.

use mockdeck_core::status::StatusId;
use mockdeck_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `stage_progress` table.
///
/// Stage name/color and the quorum requirement are immutable snapshots taken
/// when the mockup entered the stage; editing the workflow definition later
/// never rewrites them.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StageProgress {
    pub id: DbId,
    pub mockup_id: DbId,
    pub project_id: Option<DbId>,
    pub stage_order: i32,
    pub stage_name: String,
    pub stage_color: String,
    pub status_id: StatusId,
    pub approvals_required: i32,
    pub approvals_received: i32,
    pub notes: Option<String>,
    /// Increments each time the creator resubmits after a changes request.
    /// Decisions cast in an earlier round do not count toward the current
    /// round's quorum.
    pub review_round: i32,
    pub version: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new ledger row as a mockup enters a stage.
#[derive(Debug, Clone)]
pub struct CreateStageProgress {
    pub mockup_id: DbId,
    pub project_id: Option<DbId>,
    pub stage_order: i32,
    pub stage_name: String,
    pub stage_color: String,
    pub status_id: StatusId,
    pub approvals_required: i32,
}
