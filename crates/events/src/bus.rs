//! Typed review events and the in-process bus that carries them.
//!
//! Every state transition the approval engine makes is described by a
//! [`ReviewEvent`]: which mockup moved, at which stage, who should hear
//! about it, and the notification rows already written for them. The
//! [`ReviewEventBus`] fans these out to the archiver and the outbound
//! delivery worker.

use chrono::{DateTime, Utc};
use mockdeck_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// ReviewEventKind
// ---------------------------------------------------------------------------

/// What happened to a mockup under review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewEventKind {
    /// The mockup entered its first review stage.
    ReviewStarted,
    /// A stage met quorum and the next one opened.
    StageAdvanced,
    /// A reviewer sent the mockup back for changes.
    ChangesRequested,
    /// The creator resubmitted after changes.
    Resubmitted,
    /// Every stage closed; the final gate is open.
    AwaitingFinalApproval,
    /// The terminal gate was passed.
    FinalApproved,
}

impl ReviewEventKind {
    /// The wire name stored in `review_events.kind` and `notifications.kind`.
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewEventKind::ReviewStarted => "mockup.review_started",
            ReviewEventKind::StageAdvanced => "mockup.stage_advanced",
            ReviewEventKind::ChangesRequested => "mockup.changes_requested",
            ReviewEventKind::Resubmitted => "mockup.resubmitted",
            ReviewEventKind::AwaitingFinalApproval => "mockup.awaiting_final_approval",
            ReviewEventKind::FinalApproved => "mockup.final_approved",
        }
    }
}

// ---------------------------------------------------------------------------
// ReviewEvent
// ---------------------------------------------------------------------------

/// One review transition, as broadcast to the notification workers.
///
/// The recipient list and the ids of their already-durable notification
/// rows travel with the event, so consumers never re-derive either: the
/// delivery worker pushes to `recipient_ids` and flips `notification_ids`
/// to delivered, and the archiver records both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewEvent {
    pub kind: ReviewEventKind,
    pub org_id: DbId,
    pub mockup_id: DbId,
    /// Mockup title, denormalized for message rendering.
    pub mockup_title: String,
    /// The stage the transition concerns, when there is one.
    pub stage_order: Option<i32>,
    pub stage_name: Option<String>,
    /// Users this transition is addressed to.
    pub recipient_ids: Vec<DbId>,
    /// Notification rows written for those users before the event was
    /// published.
    pub notification_ids: Vec<DbId>,
    /// Short human-readable headline.
    pub title: String,
    /// Longer body shown in feeds and outbound messages.
    pub message: String,
    /// When the transition committed (UTC).
    pub occurred_at: DateTime<Utc>,
}

impl ReviewEvent {
    /// Start an event for a mockup transition, stamped with the current time.
    pub fn new(
        kind: ReviewEventKind,
        org_id: DbId,
        mockup_id: DbId,
        mockup_title: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            org_id,
            mockup_id,
            mockup_title: mockup_title.into(),
            stage_order: None,
            stage_name: None,
            recipient_ids: Vec::new(),
            notification_ids: Vec::new(),
            title: String::new(),
            message: String::new(),
            occurred_at: Utc::now(),
        }
    }

    /// Set the headline and body.
    pub fn summary(mut self, title: impl Into<String>, message: impl Into<String>) -> Self {
        self.title = title.into();
        self.message = message.into();
        self
    }

    /// Attach the stage the transition concerns.
    pub fn at_stage(mut self, stage_order: i32, stage_name: impl Into<String>) -> Self {
        self.stage_order = Some(stage_order);
        self.stage_name = Some(stage_name.into());
        self
    }

    /// Attach the recipients and their durable notification rows.
    pub fn notifying(mut self, recipient_ids: Vec<DbId>, notification_ids: Vec<DbId>) -> Self {
        self.recipient_ids = recipient_ids;
        self.notification_ids = notification_ids;
        self
    }
}

// ---------------------------------------------------------------------------
// ReviewEventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out bus for [`ReviewEvent`]s.
///
/// Shared via `Arc<ReviewEventBus>`; any number of workers can subscribe
/// and each receives every published event. Slow subscribers that fall more
/// than the buffer capacity behind observe `RecvError::Lagged`.
pub struct ReviewEventBus {
    tx: broadcast::Sender<ReviewEvent>,
}

impl ReviewEventBus {
    /// Create a bus with a specific channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event, returning how many subscribers received it.
    ///
    /// Zero subscribers is not an error — the event is simply dropped, and
    /// the durable notification rows written before publishing are
    /// unaffected.
    pub fn publish(&self, event: ReviewEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<ReviewEvent> {
        self.tx.subscribe()
    }
}

impl Default for ReviewEventBus {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ReviewEvent {
        ReviewEvent::new(ReviewEventKind::StageAdvanced, 1, 42, "Hero card")
            .summary("Advanced to Legal", "Stage 2 is collecting approvals.")
            .at_stage(2, "Legal")
            .notifying(vec![7, 9], vec![100, 101])
    }

    #[test]
    fn builder_fills_every_field() {
        let event = sample();
        assert_eq!(event.kind, ReviewEventKind::StageAdvanced);
        assert_eq!(event.mockup_id, 42);
        assert_eq!(event.mockup_title, "Hero card");
        assert_eq!(event.stage_order, Some(2));
        assert_eq!(event.stage_name.as_deref(), Some("Legal"));
        assert_eq!(event.recipient_ids, vec![7, 9]);
        assert_eq!(event.notification_ids, vec![100, 101]);
        assert_eq!(event.title, "Advanced to Legal");
    }

    #[test]
    fn kind_wire_names_match_the_schema_check() {
        // These strings are enforced by ck_review_events_kind; keep in sync.
        let pairs = [
            (ReviewEventKind::ReviewStarted, "mockup.review_started"),
            (ReviewEventKind::StageAdvanced, "mockup.stage_advanced"),
            (ReviewEventKind::ChangesRequested, "mockup.changes_requested"),
            (ReviewEventKind::Resubmitted, "mockup.resubmitted"),
            (
                ReviewEventKind::AwaitingFinalApproval,
                "mockup.awaiting_final_approval",
            ),
            (ReviewEventKind::FinalApproved, "mockup.final_approved"),
        ];
        for (kind, wire) in pairs {
            assert_eq!(kind.as_str(), wire);
        }
    }

    #[tokio::test]
    async fn publish_reports_subscriber_count() {
        let bus = ReviewEventBus::default();
        assert_eq!(bus.publish(sample()), 0);

        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.publish(sample()), 2);

        assert_eq!(rx1.recv().await.unwrap().mockup_id, 42);
        assert_eq!(rx2.recv().await.unwrap().mockup_id, 42);
    }

    #[tokio::test]
    async fn subscribers_each_get_their_own_copy() {
        let bus = ReviewEventBus::with_capacity(4);
        let mut rx = bus.subscribe();

        bus.publish(sample().summary("first", ""));
        bus.publish(sample().summary("second", ""));

        assert_eq!(rx.recv().await.unwrap().title, "first");
        assert_eq!(rx.recv().await.unwrap().title, "second");
    }
}
