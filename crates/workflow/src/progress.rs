//! Derived "current review state" view.
//!
//! There is no stored `current_stage_order` pointer on the mockup; the
//! current state is derived from the ledger rows and the mockup's terminal
//! columns every time it is asked for, so it can never drift out of sync
//! with the rows under concurrent writes.

use mockdeck_core::status::ProgressStatus;
use mockdeck_core::types::DbId;
use mockdeck_db::models::mockup::Mockup;
use mockdeck_db::models::stage_progress::StageProgress;
use mockdeck_db::repositories::{MockupRepo, StageProgressRepo};
use serde::Serialize;

use crate::error::EngineError;
use crate::ApprovalEngine;

/// A mockup's current position in its review workflow.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewState {
    /// The mockup snapshot.
    pub mockup: Mockup,
    /// The derived review status name (`progress_statuses` seed values).
    pub status: &'static str,
    /// The open stage row, when one is collecting reviews or changes.
    pub current_stage: Option<StageProgress>,
}

impl ApprovalEngine {
    /// Compute a mockup's current review state.
    pub async fn current_progress(&self, mockup_id: DbId) -> Result<ReviewState, EngineError> {
        let mockup = MockupRepo::find_by_id(&self.pool, mockup_id)
            .await?
            .ok_or(EngineError::NotFound {
                entity: "Mockup",
                id: mockup_id,
            })?;

        if mockup.is_finalized() {
            return Ok(ReviewState {
                mockup,
                status: ProgressStatus::FinalApproved.name(),
                current_stage: None,
            });
        }

        if let Some(open) = StageProgressRepo::find_open(&self.pool, mockup_id).await? {
            let status = ProgressStatus::from_id(open.status_id)
                .unwrap_or(ProgressStatus::InReview)
                .name();
            return Ok(ReviewState {
                mockup,
                status,
                current_stage: Some(open),
            });
        }

        let rows = StageProgressRepo::list_for_mockup(&self.pool, mockup_id).await?;
        let status = if rows.is_empty() {
            ProgressStatus::NotStarted
        } else {
            // Every row is closed and the mockup is not finalized: the
            // terminal gate is the only thing left.
            ProgressStatus::PendingFinalApproval
        };

        Ok(ReviewState {
            mockup,
            status: status.name(),
            current_stage: None,
        })
    }

    /// List a mockup's full ledger history in stage order.
    pub async fn progress_history(
        &self,
        mockup_id: DbId,
    ) -> Result<Vec<StageProgress>, EngineError> {
        MockupRepo::find_by_id(&self.pool, mockup_id)
            .await?
            .ok_or(EngineError::NotFound {
                entity: "Mockup",
                id: mockup_id,
            })?;
        Ok(StageProgressRepo::list_for_mockup(&self.pool, mockup_id).await?)
    }
}
