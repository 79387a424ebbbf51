//! Review event bus and notification delivery for the Mockdeck backend.
//!
//! The approval workflow engine publishes a typed [`ReviewEvent`] for every
//! committed transition. Two background workers consume them:
//!
//! - [`EventArchiver`] appends each event to the `review_events` table so
//!   the dashboard can show a per-mockup timeline.
//! - [`DeliveryWorker`] pushes each event out through the configured
//!   channels ([`delivery::email`], [`delivery::slack`]) and flips the
//!   event's notification rows to delivered on success.
//!
//! Both are strictly downstream of the engine: the durable notification
//! rows exist before an event is published, so nothing here can lose or
//! roll back a transition.

pub mod archive;
pub mod bus;
pub mod delivery;

pub use archive::EventArchiver;
pub use bus::{ReviewEvent, ReviewEventBus, ReviewEventKind};
pub use delivery::email::{EmailConfig, EmailDelivery};
pub use delivery::slack::{SlackConfig, SlackDelivery};
pub use delivery::worker::DeliveryWorker;
