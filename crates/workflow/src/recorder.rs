//! Approval recorder: the entry point for reviewer decisions.
//!
//! `record_decision` is the engine's hot path. The read-modify-write over
//! the ledger — decision upsert, counter adjustment, quorum evaluation, and
//! stage advancement — runs in one transaction holding a `FOR UPDATE` lock
//! on the stage's row, so concurrent reviewers on the same stage are
//! linearized: each approval counts exactly once and a stage can never be
//! evaluated as complete twice. Immutable inputs (mockup, reviewer identity,
//! workflow stage list) are loaded before the transaction to keep the
//! critical section to the ledger writes alone.

use mockdeck_core::decision::{validate_decision, validate_decision_note, DECISION_APPROVE};
use mockdeck_core::roles::REVIEW_CAPABLE_ROLES;
use mockdeck_core::stage_flow::{self, TransitionKind};
use mockdeck_core::status::ProgressStatus;
use mockdeck_core::types::DbId;
use mockdeck_db::models::decision::CreateDecision;
use mockdeck_db::models::mockup::Mockup;
use mockdeck_db::models::stage_progress::StageProgress;
use mockdeck_db::repositories::{
    DecisionRepo, MockupRepo, ProjectRepo, ReviewerRepo, StageProgressRepo, UserRepo,
    WorkflowRepo,
};
use serde::Serialize;

use crate::coordinator;
use crate::error::EngineError;
use crate::fanout;
use crate::ApprovalEngine;

/// Result of recording a reviewer decision.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionOutcome {
    /// The mockup snapshot after the decision.
    pub mockup: Mockup,
    /// The stage row the decision acted on, post-update.
    pub progress: StageProgress,
    /// The next stage's row when the decision advanced the mockup.
    pub next_stage: Option<StageProgress>,
    /// The transition that occurred; `None` for an idempotent repeat of the
    /// reviewer's identical decision.
    pub transition: Option<TransitionKind>,
}

impl ApprovalEngine {
    /// Record one reviewer decision on one stage of a mockup.
    ///
    /// Preconditions: the stage's ledger row must be `in_review` and the
    /// reviewer must count toward its quorum (or, for a stage with no
    /// explicit assignments, hold a review-capable role in the mockup's
    /// organization). Repeating an identical decision is a successful no-op;
    /// a different decision replaces the reviewer's earlier one.
    pub async fn record_decision(
        &self,
        mockup_id: DbId,
        stage_order: i32,
        reviewer_id: DbId,
        decision: &str,
        note: Option<String>,
    ) -> Result<DecisionOutcome, EngineError> {
        validate_decision(decision)?;
        validate_decision_note(&note)?;

        let mockup = MockupRepo::find_by_id(&self.pool, mockup_id)
            .await?
            .ok_or(EngineError::NotFound {
                entity: "Mockup",
                id: mockup_id,
            })?;

        // Identity resolution guards authorization and fails closed: any
        // lookup error propagates instead of defaulting.
        let reviewer = UserRepo::find_by_id(&self.pool, reviewer_id)
            .await?
            .ok_or(EngineError::NotFound {
                entity: "User",
                id: reviewer_id,
            })?;

        // Only mockups under a project workflow ever hold an in_review row.
        let Some(project_id) = mockup.project_id else {
            return Err(EngineError::NotInReview {
                mockup_id,
                stage_order,
            });
        };
        let project = ProjectRepo::find_by_id(&self.pool, project_id)
            .await?
            .ok_or(EngineError::NotFound {
                entity: "Project",
                id: project_id,
            })?;
        let Some(workflow_id) = project.workflow_id else {
            return Err(EngineError::NotInReview {
                mockup_id,
                stage_order,
            });
        };

        // The stage list is append-only once referenced, so it can be read
        // outside the ledger transaction.
        let stages = WorkflowRepo::stages(&self.pool, workflow_id).await?;
        let max_order = stages.last().map(|s| s.stage_order).unwrap_or(stage_order);
        let is_last_stage = stage_order >= max_order;

        let mut tx = self.pool.begin().await?;

        let progress = StageProgressRepo::lock_for_stage(&mut *tx, mockup_id, stage_order)
            .await?
            .ok_or(EngineError::NotInReview {
                mockup_id,
                stage_order,
            })?;

        if progress.status_id != ProgressStatus::InReview.id() {
            return Err(EngineError::NotInReview {
                mockup_id,
                stage_order,
            });
        }

        let assigned =
            ReviewerRepo::reviewers_for_stage(&mut *tx, project_id, stage_order).await?;
        let authorized = if assigned.is_empty() {
            reviewer.org_id == mockup.org_id
                && REVIEW_CAPABLE_ROLES.contains(&reviewer.role.as_str())
        } else {
            assigned.contains(&reviewer_id)
        };
        if !authorized {
            return Err(EngineError::NotAuthorizedReviewer {
                user_id: reviewer_id,
            });
        }

        // Idempotency: an identical decision in the current review round is
        // a successful no-op, not an error and not a second count.
        let existing = DecisionRepo::find(&mut *tx, mockup_id, stage_order, reviewer_id).await?;
        if let Some(prev) = &existing {
            if prev.review_round == progress.review_round && prev.decision == decision {
                tx.rollback().await?;
                return Ok(DecisionOutcome {
                    mockup,
                    progress,
                    next_stage: None,
                    transition: None,
                });
            }
        }

        DecisionRepo::upsert(
            &mut *tx,
            &CreateDecision {
                mockup_id,
                stage_order,
                reviewer_id,
                decision: decision.to_string(),
                note: note.clone(),
                review_round: progress.review_round,
            },
        )
        .await?;

        // A same-round prior decision can only be a stale approve (handled
        // above as a no-op); anything else belongs to an earlier round whose
        // counter was already reset, so an approval always adds one.
        let new_received = if decision == DECISION_APPROVE {
            progress.approvals_received + 1
        } else {
            progress.approvals_received
        };

        let transition = stage_flow::evaluate(
            decision,
            new_received,
            progress.approvals_required,
            is_last_stage,
        )?;

        let (progress, next_stage) = match transition {
            TransitionKind::PartialApproval => {
                let updated = StageProgressRepo::apply_approval(
                    &mut *tx,
                    progress.id,
                    new_received,
                    ProgressStatus::InReview.id(),
                )
                .await?;
                (updated, None)
            }
            TransitionKind::AwaitingFinalApproval => {
                let updated = StageProgressRepo::apply_approval(
                    &mut *tx,
                    progress.id,
                    new_received,
                    ProgressStatus::Approved.id(),
                )
                .await?;
                (updated, None)
            }
            TransitionKind::StageAdvanced => {
                let updated = StageProgressRepo::apply_approval(
                    &mut *tx,
                    progress.id,
                    new_received,
                    ProgressStatus::Approved.id(),
                )
                .await?;
                let entry = coordinator::enter_stage(
                    &mut tx,
                    &mockup,
                    project_id,
                    &stages,
                    stage_order + 1,
                )
                .await?;
                (updated, entry.current)
            }
            TransitionKind::ChangesRequested => {
                let updated = StageProgressRepo::apply_changes_requested(
                    &mut *tx,
                    progress.id,
                    note.as_deref(),
                )
                .await?;
                (updated, None)
            }
        };

        // The cascade may have auto-approved every remaining stage, which
        // turns a StageAdvanced into AwaitingFinalApproval.
        let transition = if transition == TransitionKind::StageAdvanced && next_stage.is_none() {
            TransitionKind::AwaitingFinalApproval
        } else {
            transition
        };

        tx.commit().await?;

        tracing::info!(
            mockup_id,
            stage_order,
            reviewer_id,
            decision,
            transition = ?transition,
            approvals_received = progress.approvals_received,
            approvals_required = progress.approvals_required,
            "Recorded review decision"
        );

        // Fan-out is best-effort and runs after commit: a notification
        // failure must never roll back the transition.
        match transition {
            TransitionKind::StageAdvanced => {
                if let Some(next) = &next_stage {
                    fanout::notify_stage_advanced(&self.pool, &self.bus, &mockup, next).await;
                }
            }
            TransitionKind::AwaitingFinalApproval => {
                fanout::notify_awaiting_final_approval(&self.pool, &self.bus, &mockup).await;
            }
            TransitionKind::ChangesRequested => {
                fanout::notify_changes_requested(&self.pool, &self.bus, &mockup, &progress).await;
            }
            TransitionKind::PartialApproval => {}
        }

        Ok(DecisionOutcome {
            mockup,
            progress,
            next_stage,
            transition: Some(transition),
        })
    }
}
