//! Best-effort outbound delivery worker.
//!
//! [`DeliveryWorker`] drains the review event bus and pushes each event out
//! through whichever channels are configured. A fully successful dispatch
//! flips the event's notification rows to delivered; anything else — a
//! failed channel, a missing address, the dispatch timeout — is logged and
//! dropped. The durable notification records were written by the engine
//! before the event was published, so only the outbound push is ever at
//! stake here.

use std::time::Duration;

use mockdeck_db::repositories::{NotificationRepo, UserRepo};
use mockdeck_db::DbPool;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::bus::ReviewEvent;
use crate::delivery::email::{EmailConfig, EmailDelivery};
use crate::delivery::slack::{SlackConfig, SlackDelivery};

/// Upper bound for one event's outbound dispatch across all channels.
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Background worker driving the email and Slack channels.
pub struct DeliveryWorker {
    pool: DbPool,
    email: Option<EmailDelivery>,
    slack: Option<SlackDelivery>,
}

impl DeliveryWorker {
    /// Build a worker from environment configuration.
    ///
    /// Unconfigured channels are skipped; a worker with no channels still
    /// drains the bus so other subscribers never lag behind it.
    pub fn from_env(pool: DbPool) -> Self {
        let email = EmailConfig::from_env().and_then(|config| match EmailDelivery::new(config) {
            Ok(delivery) => Some(delivery),
            Err(e) => {
                tracing::error!(error = %e, "Email channel misconfigured, disabling");
                None
            }
        });
        let slack = SlackConfig::from_env().map(SlackDelivery::new);
        if email.is_none() && slack.is_none() {
            tracing::info!("No outbound notification channels configured");
        }
        Self { pool, email, slack }
    }

    /// Run the delivery loop until the bus closes or `cancel` fires.
    pub async fn run(
        self,
        mut receiver: broadcast::Receiver<ReviewEvent>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Delivery worker cancelled, shutting down");
                    break;
                }
                received = receiver.recv() => match received {
                    Ok(event) => self.handle(event).await,
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "Delivery worker fell behind, pushes were skipped");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Review event bus closed, delivery worker shutting down");
                        break;
                    }
                },
            }
        }
    }

    /// Dispatch one event within the delivery timeout and record delivery
    /// when every attempted push succeeded.
    async fn handle(&self, event: ReviewEvent) {
        if self.email.is_none() && self.slack.is_none() {
            return;
        }

        let all_sent = match tokio::time::timeout(DELIVERY_TIMEOUT, self.dispatch(&event)).await {
            Ok(all_sent) => all_sent,
            Err(_) => {
                tracing::warn!(
                    kind = event.kind.as_str(),
                    mockup_id = event.mockup_id,
                    timeout_secs = DELIVERY_TIMEOUT.as_secs(),
                    "Outbound delivery timed out, dropping event"
                );
                return;
            }
        };

        if all_sent {
            if let Err(e) =
                NotificationRepo::mark_delivered(&self.pool, &event.notification_ids).await
            {
                tracing::warn!(error = %e, "Failed to record notification delivery");
            }
        }
    }

    /// Push one event through every configured channel.
    ///
    /// Returns `true` only when every attempted send succeeded.
    async fn dispatch(&self, event: &ReviewEvent) -> bool {
        let mut all_sent = true;

        if let Some(email) = &self.email {
            let addresses = match UserRepo::emails_for_ids(&self.pool, &event.recipient_ids).await
            {
                Ok(addresses) => addresses,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to resolve recipient emails");
                    Vec::new()
                }
            };
            if addresses.len() != event.recipient_ids.len() {
                all_sent = false;
            }
            for address in &addresses {
                if let Err(e) = email.deliver(address, event).await {
                    tracing::warn!(
                        to = %address,
                        kind = event.kind.as_str(),
                        error = %e,
                        "Email delivery failed"
                    );
                    all_sent = false;
                }
            }
        }

        if let Some(slack) = &self.slack {
            if slack.deliver(event).await.is_err() {
                all_sent = false;
            }
        }

        all_sent
    }
}
