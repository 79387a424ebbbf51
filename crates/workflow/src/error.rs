//! Engine error type.

use mockdeck_core::error::CoreError;
use mockdeck_core::types::DbId;

/// Errors produced by the approval workflow engine.
///
/// The precondition variants map to 4xx responses and are not retryable;
/// `Conflict` signals a lost race the caller may retry (the retry is
/// idempotent: a repeated identical decision is a no-op). Database errors
/// from collaborator lookups propagate unchanged — identity resolution
/// guards authorization and must fail closed.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// An entity lookup by id found nothing.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// The target stage is not collecting reviews.
    #[error("Stage {stage_order} of mockup {mockup_id} is not open for review")]
    NotInReview { mockup_id: DbId, stage_order: i32 },

    /// The user does not count toward this stage's quorum.
    #[error("User {user_id} is not an authorized reviewer for this stage")]
    NotAuthorizedReviewer { user_id: DbId },

    /// The mockup has stages still open; the final gate is closed.
    #[error("Mockup {mockup_id} is not awaiting final approval")]
    NotReadyForFinal { mockup_id: DbId },

    /// The caller lacks the role required for this operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The terminal gate was already passed by someone else.
    #[error("Mockup {mockup_id} is already finalized")]
    AlreadyFinalized { mockup_id: DbId },

    /// The operation conflicts with current review state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A domain validation error from `mockdeck-core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error.
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}
