//! Reviewer assignment models and DTOs.

use mockdeck_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `reviewer_assignments` table.
///
/// `stage_order = NULL` assigns the reviewer to every stage of the project;
/// a non-NULL value is a stage-level override.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReviewerAssignment {
    pub id: DbId,
    pub project_id: DbId,
    pub user_id: DbId,
    pub stage_order: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for assigning a reviewer to a project or stage.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssignment {
    pub user_id: DbId,
    pub stage_order: Option<i32>,
}
