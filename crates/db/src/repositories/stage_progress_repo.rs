//! Repository for the `stage_progress` ledger table.
//!
//! The ledger is the single mutable shared resource of the approval engine.
//! Every mutating method here takes `&mut PgConnection` and is expected to
//! run inside the engine's transaction, after `lock_for_stage` has taken the
//! row lock that serializes concurrent reviewers. `version` increments on
//! every write. Rows are never deleted.

use mockdeck_core::status::{ProgressStatus, StatusId};
use mockdeck_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::stage_progress::{CreateStageProgress, StageProgress};

/// Column list for `stage_progress` queries.
const COLUMNS: &str = "\
    id, mockup_id, project_id, stage_order, stage_name, stage_color, \
    status_id, approvals_required, approvals_received, notes, review_round, \
    version, created_at, updated_at";

/// Provides operations on the stage progress ledger.
pub struct StageProgressRepo;

impl StageProgressRepo {
    /// Insert a new ledger row as a mockup enters a stage.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateStageProgress,
    ) -> Result<StageProgress, sqlx::Error> {
        let query = format!(
            "INSERT INTO stage_progress \
                (mockup_id, project_id, stage_order, stage_name, stage_color, \
                 status_id, approvals_required) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StageProgress>(&query)
            .bind(input.mockup_id)
            .bind(input.project_id)
            .bind(input.stage_order)
            .bind(&input.stage_name)
            .bind(&input.stage_color)
            .bind(input.status_id)
            .bind(input.approvals_required)
            .fetch_one(conn)
            .await
    }

    /// Lock and return the ledger row for (mockup, stage).
    ///
    /// `SELECT ... FOR UPDATE` serializes all concurrent reviewer actions on
    /// the same stage: the second transaction blocks here until the first
    /// commits, then observes its writes.
    pub async fn lock_for_stage(
        conn: &mut PgConnection,
        mockup_id: DbId,
        stage_order: i32,
    ) -> Result<Option<StageProgress>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM stage_progress \
             WHERE mockup_id = $1 AND stage_order = $2 \
             FOR UPDATE"
        );
        sqlx::query_as::<_, StageProgress>(&query)
            .bind(mockup_id)
            .bind(stage_order)
            .fetch_optional(conn)
            .await
    }

    /// Lock and return the mockup's open row (`in_review` or
    /// `changes_requested`), if any. Used by resubmission, which does not
    /// know the stage order up front.
    pub async fn lock_open(
        conn: &mut PgConnection,
        mockup_id: DbId,
    ) -> Result<Option<StageProgress>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM stage_progress \
             WHERE mockup_id = $1 AND status_id IN ($2, $3) \
             ORDER BY stage_order DESC \
             LIMIT 1 \
             FOR UPDATE"
        );
        sqlx::query_as::<_, StageProgress>(&query)
            .bind(mockup_id)
            .bind(ProgressStatus::InReview.id())
            .bind(ProgressStatus::ChangesRequested.id())
            .fetch_optional(conn)
            .await
    }

    /// Read the ledger row for (mockup, stage) without locking.
    pub async fn find_for_stage(
        pool: &PgPool,
        mockup_id: DbId,
        stage_order: i32,
    ) -> Result<Option<StageProgress>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM stage_progress \
             WHERE mockup_id = $1 AND stage_order = $2"
        );
        sqlx::query_as::<_, StageProgress>(&query)
            .bind(mockup_id)
            .bind(stage_order)
            .fetch_optional(pool)
            .await
    }

    /// Find the mockup's open row: the one `in_review` or `changes_requested`.
    ///
    /// "Current" is derived from row statuses, never stored as a pointer on
    /// the mockup, so it cannot drift out of sync under races.
    pub async fn find_open(
        pool: &PgPool,
        mockup_id: DbId,
    ) -> Result<Option<StageProgress>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM stage_progress \
             WHERE mockup_id = $1 AND status_id IN ($2, $3) \
             ORDER BY stage_order DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, StageProgress>(&query)
            .bind(mockup_id)
            .bind(ProgressStatus::InReview.id())
            .bind(ProgressStatus::ChangesRequested.id())
            .fetch_optional(pool)
            .await
    }

    /// List all ledger rows for a mockup in stage order (audit trail).
    pub async fn list_for_mockup(
        pool: &PgPool,
        mockup_id: DbId,
    ) -> Result<Vec<StageProgress>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM stage_progress \
             WHERE mockup_id = $1 \
             ORDER BY stage_order ASC"
        );
        sqlx::query_as::<_, StageProgress>(&query)
            .bind(mockup_id)
            .fetch_all(pool)
            .await
    }

    /// Count a mockup's ledger rows and how many of them are not yet approved.
    ///
    /// The final-approval gate is open when the first count is positive and
    /// the second is zero.
    pub async fn review_summary(
        conn: &mut PgConnection,
        mockup_id: DbId,
    ) -> Result<(i64, i64), sqlx::Error> {
        sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE status_id != $2) \
             FROM stage_progress \
             WHERE mockup_id = $1",
        )
        .bind(mockup_id)
        .bind(ProgressStatus::Approved.id())
        .fetch_one(conn)
        .await
    }

    /// Update counter and status after an approval was counted.
    pub async fn apply_approval(
        conn: &mut PgConnection,
        id: DbId,
        approvals_received: i32,
        status: StatusId,
    ) -> Result<StageProgress, sqlx::Error> {
        let query = format!(
            "UPDATE stage_progress \
             SET approvals_received = $2, status_id = $3, \
                 version = version + 1, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StageProgress>(&query)
            .bind(id)
            .bind(approvals_received)
            .bind(status)
            .fetch_one(conn)
            .await
    }

    /// Reset the stage after a changes request: counter back to zero, notes
    /// recorded from the reviewer.
    pub async fn apply_changes_requested(
        conn: &mut PgConnection,
        id: DbId,
        notes: Option<&str>,
    ) -> Result<StageProgress, sqlx::Error> {
        let query = format!(
            "UPDATE stage_progress \
             SET status_id = $2, approvals_received = 0, notes = $3, \
                 version = version + 1, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StageProgress>(&query)
            .bind(id)
            .bind(ProgressStatus::ChangesRequested.id())
            .bind(notes)
            .fetch_one(conn)
            .await
    }

    /// Flip a `changes_requested` row back to `in_review` on resubmission.
    ///
    /// The existing row is reused, no new ledger entry is created, and the
    /// counter is re-zeroed so a full re-review is required. The bumped
    /// `review_round` invalidates decisions cast in earlier rounds.
    pub async fn reopen_for_review(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<StageProgress, sqlx::Error> {
        let query = format!(
            "UPDATE stage_progress \
             SET status_id = $2, approvals_received = 0, \
                 review_round = review_round + 1, \
                 version = version + 1, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StageProgress>(&query)
            .bind(id)
            .bind(ProgressStatus::InReview.id())
            .fetch_one(conn)
            .await
    }

    /// The highest stage_order any in-progress ledger references for a
    /// workflow. Used to reject definition edits that would rewrite history.
    pub async fn max_referenced_order(
        pool: &PgPool,
        workflow_id: DbId,
    ) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT MAX(sp.stage_order) \
             FROM stage_progress sp \
             JOIN projects p ON p.id = sp.project_id \
             WHERE p.workflow_id = $1",
        )
        .bind(workflow_id)
        .fetch_one(pool)
        .await
    }
}
