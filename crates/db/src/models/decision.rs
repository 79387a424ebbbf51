//! Stage decision models and DTOs.

use mockdeck_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `stage_decisions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StageDecision {
    pub id: DbId,
    pub mockup_id: DbId,
    pub stage_order: i32,
    pub reviewer_id: DbId,
    pub decision: String,
    pub note: Option<String>,
    /// The stage's review round this decision was cast in.
    pub review_round: i32,
    pub decided_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording (or replacing) a reviewer's decision.
#[derive(Debug, Clone)]
pub struct CreateDecision {
    pub mockup_id: DbId,
    pub stage_order: i32,
    pub reviewer_id: DbId,
    pub decision: String,
    pub note: Option<String>,
    pub review_round: i32,
}

/// Request body for the approve endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ApproveRequest {
    pub note: Option<String>,
}

/// Request body for the request-changes endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestChangesRequest {
    pub note: Option<String>,
}
