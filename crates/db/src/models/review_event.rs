//! Review event log models.

use mockdeck_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `review_events` table: one committed review transition.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReviewEventRow {
    pub id: DbId,
    pub org_id: DbId,
    pub mockup_id: DbId,
    pub kind: String,
    pub stage_order: Option<i32>,
    pub recipient_ids: Vec<DbId>,
    pub title: String,
    pub message: String,
    pub occurred_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for archiving a review transition.
#[derive(Debug, Clone)]
pub struct NewReviewEvent {
    pub org_id: DbId,
    pub mockup_id: DbId,
    pub kind: &'static str,
    pub stage_order: Option<i32>,
    pub recipient_ids: Vec<DbId>,
    pub title: String,
    pub message: String,
    pub occurred_at: Timestamp,
}
