//! HTTP request handlers.
//!
//! Handlers stay thin: tenancy comes from the access token's org claim,
//! domain rules live in `mockdeck-core`, and all review semantics live in
//! the `mockdeck-workflow` engine.

pub mod auth;
pub mod mockup;
pub mod notification;
pub mod project;
pub mod review;
pub mod workflow;
