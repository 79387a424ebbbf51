//! Notification entity model and DTOs.

use mockdeck_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub org_id: DbId,
    pub user_id: DbId,
    pub mockup_id: Option<DbId>,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub channel: String,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub is_delivered: bool,
    pub delivered_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for a notification about to be fanned out.
///
/// The recipient is deliberately absent: the fan-out writes one row per
/// recipient from a single template via `NotificationRepo::create_batch`.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub org_id: DbId,
    pub mockup_id: Option<DbId>,
    pub kind: &'static str,
    pub title: String,
    pub message: String,
    pub channel: &'static str,
}
