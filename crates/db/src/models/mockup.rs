//! Mockup entity model and DTOs.

use mockdeck_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `mockups` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Mockup {
    pub id: DbId,
    pub org_id: DbId,
    pub project_id: Option<DbId>,
    pub created_by: DbId,
    pub title: String,
    pub final_approved_by: Option<DbId>,
    pub final_approved_at: Option<Timestamp>,
    pub final_approval_notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Mockup {
    /// True once the terminal final-approval gate has been passed.
    pub fn is_finalized(&self) -> bool {
        self.final_approved_by.is_some()
    }
}

/// DTO for creating a new mockup.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMockup {
    pub project_id: Option<DbId>,
    pub title: String,
}
