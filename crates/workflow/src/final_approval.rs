//! The terminal final-approval gate.
//!
//! Final approval is deliberately decoupled from per-stage quorum: it exists
//! even for zero-stage workflows and is restricted to the project's creator
//! or an organization admin. The transition is one-way; the conditional
//! UPDATE in [`MockupRepo::grant_final_approval`] makes a repeat call fail
//! with [`EngineError::AlreadyFinalized`] rather than silently succeed, so
//! callers can tell "someone already approved" from "you approved".

use mockdeck_core::decision::validate_decision_note;
use mockdeck_core::types::DbId;
use mockdeck_db::models::mockup::Mockup;
use mockdeck_db::repositories::{
    DecisionRepo, MockupRepo, ProjectRepo, StageProgressRepo, UserRepo,
};

use crate::error::EngineError;
use crate::fanout;
use crate::ApprovalEngine;

impl ApprovalEngine {
    /// Grant final approval on a mockup whose stages have all closed.
    ///
    /// Authorization fails closed: an error from the role or creator lookup
    /// propagates instead of being treated as "not authorized".
    pub async fn grant_final_approval(
        &self,
        mockup_id: DbId,
        approver_id: DbId,
        note: Option<String>,
    ) -> Result<Mockup, EngineError> {
        validate_decision_note(&note)?;

        let mockup = MockupRepo::find_by_id(&self.pool, mockup_id)
            .await?
            .ok_or(EngineError::NotFound {
                entity: "Mockup",
                id: mockup_id,
            })?;

        let authorized = match mockup.project_id {
            Some(project_id) => {
                ProjectRepo::is_creator(&self.pool, project_id, approver_id).await?
                    || UserRepo::is_admin(&self.pool, approver_id, mockup.org_id).await?
            }
            None => {
                mockup.created_by == approver_id
                    || UserRepo::is_admin(&self.pool, approver_id, mockup.org_id).await?
            }
        };
        if !authorized {
            return Err(EngineError::Forbidden(
                "Only the project creator or an admin may grant final approval".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let (total, open) = StageProgressRepo::review_summary(&mut *tx, mockup_id).await?;
        if total == 0 || open > 0 {
            return Err(EngineError::NotReadyForFinal { mockup_id });
        }

        // Collected before commit so the terminal fan-out can reach every
        // reviewer who ever touched this mockup.
        let reviewer_ids = DecisionRepo::distinct_reviewer_ids(&mut *tx, mockup_id).await?;

        let finalized =
            MockupRepo::grant_final_approval(&mut *tx, mockup_id, approver_id, note.as_deref())
                .await?
                .ok_or(EngineError::AlreadyFinalized { mockup_id })?;

        tx.commit().await?;

        tracing::info!(
            mockup_id,
            approver_id,
            "Mockup finalized"
        );

        fanout::notify_final_approved(&self.pool, &self.bus, &finalized, &reviewer_ids).await;

        Ok(finalized)
    }
}
