//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Methods that must run
//! inside the engine's serialized critical section take
//! `&mut sqlx::PgConnection` instead so a caller-owned transaction can
//! span several repositories.

pub mod decision_repo;
pub mod mockup_repo;
pub mod notification_repo;
pub mod organization_repo;
pub mod project_repo;
pub mod review_event_repo;
pub mod reviewer_repo;
pub mod stage_progress_repo;
pub mod user_repo;
pub mod workflow_repo;

pub use decision_repo::DecisionRepo;
pub use mockup_repo::MockupRepo;
pub use notification_repo::NotificationRepo;
pub use organization_repo::OrganizationRepo;
pub use project_repo::ProjectRepo;
pub use review_event_repo::ReviewEventRepo;
pub use reviewer_repo::ReviewerRepo;
pub use stage_progress_repo::StageProgressRepo;
pub use user_repo::UserRepo;
pub use workflow_repo::WorkflowRepo;
