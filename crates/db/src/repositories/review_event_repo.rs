//! Repository for the `review_events` log table.

use mockdeck_core::types::DbId;
use sqlx::PgPool;

use crate::models::review_event::{NewReviewEvent, ReviewEventRow};

/// Column list for `review_events` queries.
const COLUMNS: &str = "\
    id, org_id, mockup_id, kind, stage_order, recipient_ids, title, message, \
    occurred_at, created_at, updated_at";

/// Append-only access to the review transition log.
pub struct ReviewEventRepo;

impl ReviewEventRepo {
    /// Append one transition to the log, returning the generated ID.
    ///
    /// `kind` must be one of the wire names accepted by
    /// `ck_review_events_kind`; anything else is rejected by the database.
    pub async fn record(pool: &PgPool, event: &NewReviewEvent) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO review_events \
                (org_id, mockup_id, kind, stage_order, recipient_ids, title, message, occurred_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id",
        )
        .bind(event.org_id)
        .bind(event.mockup_id)
        .bind(event.kind)
        .bind(event.stage_order)
        .bind(&event.recipient_ids)
        .bind(&event.title)
        .bind(&event.message)
        .bind(event.occurred_at)
        .fetch_one(pool)
        .await
    }

    /// A mockup's review timeline, oldest first.
    pub async fn timeline_for_mockup(
        pool: &PgPool,
        mockup_id: DbId,
        limit: i64,
    ) -> Result<Vec<ReviewEventRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM review_events \
             WHERE mockup_id = $1 \
             ORDER BY occurred_at ASC \
             LIMIT $2"
        );
        sqlx::query_as::<_, ReviewEventRow>(&query)
            .bind(mockup_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
