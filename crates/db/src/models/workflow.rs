//! Workflow definition models and DTOs.

use mockdeck_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `workflows` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Workflow {
    pub id: DbId,
    pub org_id: DbId,
    pub created_by: DbId,
    pub name: String,
    pub is_archived: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `workflow_stages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkflowStage {
    pub id: DbId,
    pub workflow_id: DbId,
    pub stage_order: i32,
    pub name: String,
    pub color: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A workflow definition with its ordered stage list.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowWithStages {
    #[serde(flatten)]
    pub workflow: Workflow,
    pub stages: Vec<WorkflowStage>,
}

/// One stage as submitted on create/update.
#[derive(Debug, Clone, Deserialize)]
pub struct StageInput {
    pub stage_order: i32,
    pub name: String,
    pub color: String,
}

/// DTO for creating a workflow definition.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorkflow {
    pub name: String,
    pub stages: Vec<StageInput>,
}

/// DTO for replacing a workflow's stage list.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateWorkflow {
    pub name: Option<String>,
    pub stages: Option<Vec<StageInput>>,
}
