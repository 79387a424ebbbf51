//! Well-known notification channel name constants.
//!
//! These must match the channel values stored in the `notifications.channel`
//! column and referenced by the delivery worker and API handlers.

/// In-app notification stored for the notification bell UI.
pub const CHANNEL_IN_APP: &str = "in_app";

/// Email notification delivered via SMTP.
pub const CHANNEL_EMAIL: &str = "email";

/// Slack notification delivered to an incoming-webhook URL.
pub const CHANNEL_SLACK: &str = "slack";
