//! Repository for the `notifications` table.
//!
//! Fan-out writes are batched: one transition produces one INSERT that
//! unnests the whole recipient list, inside the caller's transaction-free
//! post-commit path, so the rows are durable before the review event is
//! published. Delivery tracking is likewise batched by id list.

use mockdeck_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::notification::{NewNotification, Notification};

/// Column list for `notifications` queries.
const COLUMNS: &str = "\
    id, org_id, user_id, mockup_id, kind, title, message, channel, \
    is_read, read_at, is_delivered, delivered_at, created_at, updated_at";

/// Access to per-user notification records.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Write one notification row per recipient from a single template.
    ///
    /// Returns the generated ids in recipient order. An empty recipient
    /// list writes nothing and returns an empty vec.
    pub async fn create_batch(
        conn: &mut PgConnection,
        template: &NewNotification,
        recipient_ids: &[DbId],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        if recipient_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_scalar(
            "INSERT INTO notifications \
                (org_id, user_id, mockup_id, kind, title, message, channel) \
             SELECT $1, r.recipient, $2, $3, $4, $5, $6 \
             FROM UNNEST($7::BIGINT[]) AS r(recipient) \
             RETURNING id",
        )
        .bind(template.org_id)
        .bind(template.mockup_id)
        .bind(template.kind)
        .bind(&template.title)
        .bind(&template.message)
        .bind(template.channel)
        .bind(recipient_ids)
        .fetch_all(conn)
        .await
    }

    /// A user's notification feed, newest first.
    ///
    /// `unread_only` narrows the feed to rows not yet marked read; the
    /// filter is a bound parameter rather than spliced SQL.
    pub async fn feed(
        pool: &PgPool,
        user_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE user_id = $1 AND (NOT $2 OR is_read = FALSE) \
             ORDER BY created_at DESC \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(unread_only)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// How many of a user's notifications are unread.
    pub async fn unread_count(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Mark one of the user's notifications as read.
    ///
    /// Scoped to the owner so one user cannot touch another's feed; returns
    /// `false` when the row is missing, foreign, or already read.
    pub async fn mark_read(
        pool: &PgPool,
        notification_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_read = TRUE, read_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 AND is_read = FALSE",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Clear a user's entire unread backlog; returns how many rows flipped.
    pub async fn mark_all_read(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_read = TRUE, read_at = NOW(), updated_at = NOW() \
             WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Record that the outbound push for a batch of notifications went out.
    ///
    /// Called by the delivery worker after a successful dispatch; already
    /// delivered rows are skipped.
    pub async fn mark_delivered(
        pool: &PgPool,
        notification_ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        if notification_ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_delivered = TRUE, delivered_at = NOW(), updated_at = NOW() \
             WHERE id = ANY($1) AND is_delivered = FALSE",
        )
        .bind(notification_ids)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
