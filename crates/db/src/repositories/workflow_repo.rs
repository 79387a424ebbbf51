//! Repository for the `workflows` and `workflow_stages` tables.
//!
//! Stage lists are validated in `mockdeck_core::workflow` before they reach
//! this layer; the repository only persists them.

use mockdeck_core::types::DbId;
use sqlx::PgPool;

use crate::models::workflow::{StageInput, Workflow, WorkflowStage, WorkflowWithStages};

/// Column list for `workflows` queries.
const WORKFLOW_COLUMNS: &str =
    "id, org_id, created_by, name, is_archived, created_at, updated_at";

/// Column list for `workflow_stages` queries.
const STAGE_COLUMNS: &str =
    "id, workflow_id, stage_order, name, color, created_at, updated_at";

/// Provides CRUD operations for workflow definitions.
pub struct WorkflowRepo;

impl WorkflowRepo {
    /// Insert a workflow and its stage list in one transaction.
    pub async fn create(
        pool: &PgPool,
        org_id: DbId,
        created_by: DbId,
        name: &str,
        stages: &[StageInput],
    ) -> Result<WorkflowWithStages, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO workflows (org_id, created_by, name) \
             VALUES ($1, $2, $3) \
             RETURNING {WORKFLOW_COLUMNS}"
        );
        let workflow = sqlx::query_as::<_, Workflow>(&query)
            .bind(org_id)
            .bind(created_by)
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;

        let mut rows = Vec::with_capacity(stages.len());
        for stage in stages {
            let query = format!(
                "INSERT INTO workflow_stages (workflow_id, stage_order, name, color) \
                 VALUES ($1, $2, $3, $4) \
                 RETURNING {STAGE_COLUMNS}"
            );
            let row = sqlx::query_as::<_, WorkflowStage>(&query)
                .bind(workflow.id)
                .bind(stage.stage_order)
                .bind(&stage.name)
                .bind(&stage.color)
                .fetch_one(&mut *tx)
                .await?;
            rows.push(row);
        }

        tx.commit().await?;
        Ok(WorkflowWithStages {
            workflow,
            stages: rows,
        })
    }

    /// Find a workflow by ID (without stages).
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Workflow>, sqlx::Error> {
        let query = format!("SELECT {WORKFLOW_COLUMNS} FROM workflows WHERE id = $1");
        sqlx::query_as::<_, Workflow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a workflow together with its ordered stage list.
    pub async fn find_with_stages(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<WorkflowWithStages>, sqlx::Error> {
        let Some(workflow) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let stages = Self::stages(pool, id).await?;
        Ok(Some(WorkflowWithStages { workflow, stages }))
    }

    /// List a workflow's stages ordered by stage_order ascending.
    pub async fn stages(pool: &PgPool, workflow_id: DbId) -> Result<Vec<WorkflowStage>, sqlx::Error> {
        let query = format!(
            "SELECT {STAGE_COLUMNS} FROM workflow_stages \
             WHERE workflow_id = $1 \
             ORDER BY stage_order ASC"
        );
        sqlx::query_as::<_, WorkflowStage>(&query)
            .bind(workflow_id)
            .fetch_all(pool)
            .await
    }

    /// Find a single stage of a workflow by its order.
    pub async fn find_stage(
        pool: &PgPool,
        workflow_id: DbId,
        stage_order: i32,
    ) -> Result<Option<WorkflowStage>, sqlx::Error> {
        let query = format!(
            "SELECT {STAGE_COLUMNS} FROM workflow_stages \
             WHERE workflow_id = $1 AND stage_order = $2"
        );
        sqlx::query_as::<_, WorkflowStage>(&query)
            .bind(workflow_id)
            .bind(stage_order)
            .fetch_optional(pool)
            .await
    }

    /// The highest stage_order defined for a workflow, if any.
    pub async fn max_stage_order(
        pool: &PgPool,
        workflow_id: DbId,
    ) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT MAX(stage_order) FROM workflow_stages WHERE workflow_id = $1",
        )
        .bind(workflow_id)
        .fetch_one(pool)
        .await
    }

    /// List unarchived workflows for an organization, newest first.
    pub async fn list_for_org(pool: &PgPool, org_id: DbId) -> Result<Vec<Workflow>, sqlx::Error> {
        let query = format!(
            "SELECT {WORKFLOW_COLUMNS} FROM workflows \
             WHERE org_id = $1 AND is_archived = FALSE \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Workflow>(&query)
            .bind(org_id)
            .fetch_all(pool)
            .await
    }

    /// Replace a workflow's name and/or stage list in one transaction.
    ///
    /// Edit legality against in-progress ledgers is checked by the caller
    /// (`mockdeck_core::workflow::validate_stage_edit`); this method only
    /// persists the replacement.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        name: Option<&str>,
        stages: Option<&[StageInput]>,
    ) -> Result<Option<WorkflowWithStages>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE workflows \
             SET name = COALESCE($2, name), updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {WORKFLOW_COLUMNS}"
        );
        let Some(workflow) = sqlx::query_as::<_, Workflow>(&query)
            .bind(id)
            .bind(name)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        if let Some(stages) = stages {
            sqlx::query("DELETE FROM workflow_stages WHERE workflow_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for stage in stages {
                sqlx::query(
                    "INSERT INTO workflow_stages (workflow_id, stage_order, name, color) \
                     VALUES ($1, $2, $3, $4)",
                )
                .bind(id)
                .bind(stage.stage_order)
                .bind(&stage.name)
                .bind(&stage.color)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Self::find_with_stages(pool, id).await
    }

    /// Archive a workflow, hiding it from new projects.
    ///
    /// Returns `true` if the workflow existed and was updated.
    pub async fn archive(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE workflows \
             SET is_archived = TRUE, updated_at = NOW() \
             WHERE id = $1 AND is_archived = FALSE",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
