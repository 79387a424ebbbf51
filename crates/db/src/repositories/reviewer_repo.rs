//! Repository for the `reviewer_assignments` table.

use mockdeck_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::reviewer::{CreateAssignment, ReviewerAssignment};

/// Column list for `reviewer_assignments` queries.
const COLUMNS: &str = "id, project_id, user_id, stage_order, created_at, updated_at";

/// Provides operations on reviewer assignments.
pub struct ReviewerRepo;

impl ReviewerRepo {
    /// Assign a reviewer to a project (stage_order NULL) or to one stage.
    pub async fn assign(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateAssignment,
    ) -> Result<ReviewerAssignment, sqlx::Error> {
        let query = format!(
            "INSERT INTO reviewer_assignments (project_id, user_id, stage_order) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReviewerAssignment>(&query)
            .bind(project_id)
            .bind(input.user_id)
            .bind(input.stage_order)
            .fetch_one(pool)
            .await
    }

    /// Remove an assignment. Returns `true` if a row was deleted.
    pub async fn remove(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
        stage_order: Option<i32>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM reviewer_assignments \
             WHERE project_id = $1 AND user_id = $2 AND stage_order IS NOT DISTINCT FROM $3",
        )
        .bind(project_id)
        .bind(user_id)
        .bind(stage_order)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List all assignments for a project.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ReviewerAssignment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reviewer_assignments \
             WHERE project_id = $1 \
             ORDER BY stage_order NULLS FIRST, user_id ASC"
        );
        sqlx::query_as::<_, ReviewerAssignment>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// The reviewer set that counts toward a stage's quorum.
    ///
    /// Stage-level overrides win: if any assignment names this stage_order
    /// explicitly, only those users count; otherwise the project-wide
    /// (stage_order NULL) assignments apply. The result is snapshotted into
    /// `approvals_required` at stage entry, so later changes here never move
    /// an in-progress stage's target.
    pub async fn reviewers_for_stage(
        conn: &mut PgConnection,
        project_id: DbId,
        stage_order: i32,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let overrides: Vec<DbId> = sqlx::query_scalar(
            "SELECT user_id FROM reviewer_assignments \
             WHERE project_id = $1 AND stage_order = $2 \
             ORDER BY user_id ASC",
        )
        .bind(project_id)
        .bind(stage_order)
        .fetch_all(&mut *conn)
        .await?;

        if !overrides.is_empty() {
            return Ok(overrides);
        }

        sqlx::query_scalar(
            "SELECT user_id FROM reviewer_assignments \
             WHERE project_id = $1 AND stage_order IS NULL \
             ORDER BY user_id ASC",
        )
        .bind(project_id)
        .fetch_all(conn)
        .await
    }
}
