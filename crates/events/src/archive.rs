//! Review event archiver.
//!
//! [`EventArchiver`] drains the bus into the `review_events` table so every
//! committed transition is queryable later as a per-mockup timeline. The
//! notification rows are written by the engine before an event is
//! published, so a lost archive row costs the timeline entry only, never a
//! notification.

use mockdeck_db::models::review_event::NewReviewEvent;
use mockdeck_db::repositories::ReviewEventRepo;
use mockdeck_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::ReviewEvent;

/// Background task that appends every review event to the durable log.
pub struct EventArchiver {
    pool: DbPool,
}

impl EventArchiver {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Drain the bus until it closes.
    pub async fn run(self, mut receiver: broadcast::Receiver<ReviewEvent>) {
        let mut archived: u64 = 0;
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    match ReviewEventRepo::record(&self.pool, &Self::to_row(&event)).await {
                        Ok(_) => archived += 1,
                        Err(e) => {
                            tracing::error!(
                                kind = event.kind.as_str(),
                                mockup_id = event.mockup_id,
                                error = %e,
                                "Failed to archive review event"
                            );
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Review event archiver fell behind; timeline has gaps");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!(archived, "Review event bus closed, archiver stopping");
                    break;
                }
            }
        }
    }

    /// Map a bus event onto its log row.
    fn to_row(event: &ReviewEvent) -> NewReviewEvent {
        NewReviewEvent {
            org_id: event.org_id,
            mockup_id: event.mockup_id,
            kind: event.kind.as_str(),
            stage_order: event.stage_order,
            recipient_ids: event.recipient_ids.clone(),
            title: event.title.clone(),
            message: event.message.clone(),
            occurred_at: event.occurred_at,
        }
    }
}
