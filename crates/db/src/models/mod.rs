//! Entity models and DTOs.
//!
//! Row structs derive `sqlx::FromRow` and `serde::Serialize`; create/update
//! DTOs derive `serde::Deserialize` and are shared between the API handlers
//! and the repositories.

pub mod decision;
pub mod mockup;
pub mod notification;
pub mod organization;
pub mod project;
pub mod review_event;
pub mod reviewer;
pub mod stage_progress;
pub mod user;
pub mod workflow;
