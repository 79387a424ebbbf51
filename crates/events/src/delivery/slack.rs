//! Review notifications to a Slack incoming webhook.
//!
//! One message per review event, rendered from the event's typed fields.
//! Transient failures are retried with doubling backoff up to
//! [`MAX_ATTEMPTS`]; the delivery worker's overall timeout bounds the whole
//! dispatch. Leaving `SLACK_WEBHOOK_URL` unset disables the channel.

use std::time::Duration;

use crate::bus::ReviewEvent;

/// Attempts per event, including the first.
const MAX_ATTEMPTS: u32 = 3;

/// Backoff before retry `n` is `BASE_BACKOFF * 2^(n-1)`.
const BASE_BACKOFF: Duration = Duration::from_secs(1);

/// Per-request HTTP timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Error type for Slack delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum SlackError {
    /// The HTTP request itself failed (network, DNS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Slack answered with a non-success status.
    #[error("Slack webhook answered HTTP {0}")]
    Status(u16),
}

/// Webhook settings for the Slack channel.
#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub webhook_url: String,
}

impl SlackConfig {
    /// Read `SLACK_WEBHOOK_URL`; `None` means the channel is disabled.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            webhook_url: std::env::var("SLACK_WEBHOOK_URL").ok()?,
        })
    }
}

/// Slack channel for review notifications.
pub struct SlackDelivery {
    config: SlackConfig,
    client: reqwest::Client,
}

impl SlackDelivery {
    pub fn new(config: SlackConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { config, client }
    }

    /// Post one review event to the webhook, retrying with backoff.
    pub async fn deliver(&self, event: &ReviewEvent) -> Result<(), SlackError> {
        let payload = serde_json::json!({ "text": render_text(event) });

        let mut attempt = 1;
        loop {
            match self.post(&payload).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < MAX_ATTEMPTS => {
                    let backoff = BASE_BACKOFF * 2u32.pow(attempt - 1);
                    tracing::warn!(
                        attempt,
                        backoff_secs = backoff.as_secs(),
                        error = %e,
                        "Slack delivery failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(
                        kind = event.kind.as_str(),
                        mockup_id = event.mockup_id,
                        error = %e,
                        "Slack delivery gave up"
                    );
                    return Err(e);
                }
            }
        }
    }

    async fn post(&self, payload: &serde_json::Value) -> Result<(), SlackError> {
        let response = self
            .client
            .post(&self.config.webhook_url)
            .json(payload)
            .send()
            .await?;
        match response.status().is_success() {
            true => Ok(()),
            false => Err(SlackError::Status(response.status().as_u16())),
        }
    }
}

/// Render the Slack message for a review event.
fn render_text(event: &ReviewEvent) -> String {
    match (event.stage_order, event.stage_name.as_deref()) {
        (Some(order), Some(name)) => format!(
            "*{}* — {} (stage {order}: {name})",
            event.title, event.mockup_title
        ),
        _ => format!("*{}* — {}", event.title, event.mockup_title),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::ReviewEventKind;

    #[test]
    fn channel_is_disabled_without_webhook_url() {
        std::env::remove_var("SLACK_WEBHOOK_URL");
        assert!(SlackConfig::from_env().is_none());
    }

    #[test]
    fn message_includes_stage_context_when_present() {
        let event = ReviewEvent::new(ReviewEventKind::StageAdvanced, 1, 42, "Hero card")
            .summary("Advanced to Legal", "")
            .at_stage(2, "Legal");
        let text = render_text(&event);
        assert!(text.contains("Advanced to Legal"));
        assert!(text.contains("stage 2: Legal"));

        let gate = ReviewEvent::new(ReviewEventKind::FinalApproved, 1, 42, "Hero card")
            .summary("Finalized", "");
        assert!(!render_text(&gate).contains("stage"));
    }

    #[test]
    fn status_error_names_the_code() {
        assert_eq!(
            SlackError::Status(502).to_string(),
            "Slack webhook answered HTTP 502"
        );
    }
}
