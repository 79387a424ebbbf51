//! Repository for the `stage_decisions` table.

use mockdeck_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::decision::{CreateDecision, StageDecision};

/// Column list for `stage_decisions` queries.
const COLUMNS: &str = "\
    id, mockup_id, stage_order, reviewer_id, decision, note, review_round, \
    decided_at, created_at, updated_at";

/// Provides operations on reviewer decisions.
pub struct DecisionRepo;

impl DecisionRepo {
    /// Find a reviewer's existing decision for (mockup, stage), if any.
    pub async fn find(
        conn: &mut PgConnection,
        mockup_id: DbId,
        stage_order: i32,
        reviewer_id: DbId,
    ) -> Result<Option<StageDecision>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM stage_decisions \
             WHERE mockup_id = $1 AND stage_order = $2 AND reviewer_id = $3"
        );
        sqlx::query_as::<_, StageDecision>(&query)
            .bind(mockup_id)
            .bind(stage_order)
            .bind(reviewer_id)
            .fetch_optional(conn)
            .await
    }

    /// Insert a decision, or replace the reviewer's prior decision for the
    /// same stage via the `uq_stage_decisions_reviewer` constraint.
    ///
    /// A reviewer changing their mind updates the row in place; the ledger
    /// counter delta is the recorder's responsibility.
    pub async fn upsert(
        conn: &mut PgConnection,
        input: &CreateDecision,
    ) -> Result<StageDecision, sqlx::Error> {
        let query = format!(
            "INSERT INTO stage_decisions \
                (mockup_id, stage_order, reviewer_id, decision, note, review_round) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT ON CONSTRAINT uq_stage_decisions_reviewer \
             DO UPDATE SET decision = EXCLUDED.decision, note = EXCLUDED.note, \
                 review_round = EXCLUDED.review_round, \
                 decided_at = NOW(), updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StageDecision>(&query)
            .bind(input.mockup_id)
            .bind(input.stage_order)
            .bind(input.reviewer_id)
            .bind(&input.decision)
            .bind(&input.note)
            .bind(input.review_round)
            .fetch_one(conn)
            .await
    }

    /// List all decisions recorded for a stage, newest first.
    pub async fn list_for_stage(
        pool: &PgPool,
        mockup_id: DbId,
        stage_order: i32,
    ) -> Result<Vec<StageDecision>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM stage_decisions \
             WHERE mockup_id = $1 AND stage_order = $2 \
             ORDER BY decided_at DESC"
        );
        sqlx::query_as::<_, StageDecision>(&query)
            .bind(mockup_id)
            .bind(stage_order)
            .fetch_all(pool)
            .await
    }

    /// All distinct reviewers who ever recorded a decision on a mockup.
    ///
    /// Feeds the terminal-approval notification fan-out.
    pub async fn distinct_reviewer_ids(
        conn: &mut PgConnection,
        mockup_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT DISTINCT reviewer_id FROM stage_decisions WHERE mockup_id = $1",
        )
        .bind(mockup_id)
        .fetch_all(conn)
        .await
    }
}
