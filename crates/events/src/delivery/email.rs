//! Review notification emails over SMTP.
//!
//! The mailer is built once at startup from [`EmailConfig`]; each
//! [`ReviewEvent`] renders to a short plain-text message naming the mockup
//! and stage. Leaving `SMTP_HOST` unset disables the channel entirely.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::bus::ReviewEvent;

/// Default SMTP submission port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Sender used when `SMTP_FROM` is not configured.
const DEFAULT_FROM: &str = "Mockdeck <noreply@mockdeck.local>";

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// The sender or a recipient address did not parse.
    #[error("Bad email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The relay could not be configured or reached.
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// The message itself could not be assembled.
    #[error("Could not build message: {0}")]
    Message(#[from] lettre::error::Error),
}

/// SMTP settings for the email channel.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub from_address: String,
    pub credentials: Option<(String, String)>,
}

impl EmailConfig {
    /// Read the channel configuration from the environment.
    ///
    /// `SMTP_HOST` enables the channel; `SMTP_PORT` (default 587),
    /// `SMTP_FROM`, and the `SMTP_USER`/`SMTP_PASSWORD` pair are optional.
    /// Returns `None` when the channel is not configured.
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        let credentials = match (std::env::var("SMTP_USER"), std::env::var("SMTP_PASSWORD")) {
            (Ok(user), Ok(password)) => Some((user, password)),
            _ => None,
        };
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM").unwrap_or_else(|_| DEFAULT_FROM.to_string()),
            credentials,
        })
    }
}

/// Email channel for review notifications.
pub struct EmailDelivery {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl EmailDelivery {
    /// Build the transport and sender mailbox up front so per-event sends
    /// only pay for the message itself.
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let from: Mailbox = config.from_address.parse()?;

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
                .port(config.smtp_port);
        if let Some((user, password)) = config.credentials {
            builder = builder.credentials(Credentials::new(user, password));
        }

        Ok(Self {
            mailer: builder.build(),
            from,
        })
    }

    /// Send one review notification to one recipient.
    pub async fn deliver(&self, to_email: &str, event: &ReviewEvent) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(to_email.parse()?)
            .subject(format!("[Mockdeck] {}", event.title))
            .header(ContentType::TEXT_PLAIN)
            .body(render_body(event))?;

        self.mailer.send(email).await?;

        tracing::info!(
            to = to_email,
            kind = event.kind.as_str(),
            mockup_id = event.mockup_id,
            "Review notification email sent"
        );
        Ok(())
    }
}

/// Render the plain-text body for a review event.
fn render_body(event: &ReviewEvent) -> String {
    let mut body = format!("Mockup: {}\n", event.mockup_title);
    if let (Some(order), Some(name)) = (event.stage_order, event.stage_name.as_deref()) {
        body.push_str(&format!("Stage: {order} ({name})\n"));
    }
    body.push('\n');
    body.push_str(&event.message);
    body.push_str(&format!("\n\nAt: {}\n", event.occurred_at));
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::ReviewEventKind;

    fn event() -> ReviewEvent {
        ReviewEvent::new(ReviewEventKind::StageAdvanced, 1, 42, "Hero card")
            .summary("Advanced to Legal", "Stage 2 is collecting approvals.")
            .at_stage(2, "Legal")
    }

    #[test]
    fn channel_is_disabled_without_smtp_host() {
        std::env::remove_var("SMTP_HOST");
        assert!(EmailConfig::from_env().is_none());
    }

    #[test]
    fn body_names_the_mockup_and_stage() {
        let body = render_body(&event());
        assert!(body.contains("Hero card"));
        assert!(body.contains("Stage: 2 (Legal)"));
        assert!(body.contains("collecting approvals"));
    }

    #[test]
    fn body_omits_the_stage_line_for_gate_events() {
        let gate = ReviewEvent::new(ReviewEventKind::FinalApproved, 1, 42, "Hero card")
            .summary("Finalized", "The mockup received final approval.");
        assert!(!render_body(&gate).contains("Stage:"));
    }

    #[test]
    fn bad_from_address_is_a_config_error() {
        let result = EmailDelivery::new(EmailConfig {
            smtp_host: "smtp.example.test".to_string(),
            smtp_port: 587,
            from_address: "not an address".to_string(),
            credentials: None,
        });
        assert!(matches!(result, Err(EmailError::Address(_))));
    }
}
