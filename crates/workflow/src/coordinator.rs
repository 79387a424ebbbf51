//! Stage entry and review lifecycle coordination.
//!
//! `enter_stage` creates ledger rows as a mockup moves forward, snapshotting
//! stage metadata and the quorum requirement at entry time. Stages with no
//! assigned reviewers auto-approve in the same tick, so the cascade keeps
//! going until it reaches a stage that actually needs review or runs past
//! the last stage into the final-approval gate.

use mockdeck_core::status::ProgressStatus;
use mockdeck_core::types::DbId;
use mockdeck_db::models::mockup::Mockup;
use mockdeck_db::models::stage_progress::{CreateStageProgress, StageProgress};
use mockdeck_db::models::workflow::WorkflowStage;
use mockdeck_db::repositories::{
    MockupRepo, ProjectRepo, ReviewerRepo, StageProgressRepo, UserRepo, WorkflowRepo,
};
use sqlx::PgConnection;

use crate::error::EngineError;
use crate::fanout;
use crate::progress::ReviewState;
use crate::ApprovalEngine;

/// Stage metadata recorded for mockups reviewed without a workflow.
const ZERO_STAGE_NAME: &str = "Review";
const ZERO_STAGE_COLOR: &str = "#94A3B8";

/// Result of entering a stage (and cascading past auto-approved ones).
pub(crate) struct EntryOutcome {
    /// The row now collecting reviews, or `None` when every remaining stage
    /// auto-approved and the mockup reached the final-approval gate.
    pub current: Option<StageProgress>,
}

/// Create the ledger row for `start_order`, snapshotting the stage's
/// definition and reviewer count, and cascade past zero-quorum stages.
///
/// `stages` is the workflow's ordered stage list, loaded by the caller
/// before its transaction began (the list is append-only once referenced).
pub(crate) async fn enter_stage(
    conn: &mut PgConnection,
    mockup: &Mockup,
    project_id: DbId,
    stages: &[WorkflowStage],
    start_order: i32,
) -> Result<EntryOutcome, EngineError> {
    let mut stage_order = start_order;

    loop {
        let Some(stage) = stages.iter().find(|s| s.stage_order == stage_order) else {
            // Ran past the last stage: the mockup reaches the final gate.
            return Ok(EntryOutcome { current: None });
        };

        let reviewers =
            ReviewerRepo::reviewers_for_stage(&mut *conn, project_id, stage_order).await?;
        let approvals_required = reviewers.len() as i32;

        if approvals_required == 0 {
            // No reviewers assigned: the stage closes at entry, same tick.
            StageProgressRepo::create(
                &mut *conn,
                &CreateStageProgress {
                    mockup_id: mockup.id,
                    project_id: Some(project_id),
                    stage_order,
                    stage_name: stage.name.clone(),
                    stage_color: stage.color.clone(),
                    status_id: ProgressStatus::Approved.id(),
                    approvals_required: 0,
                },
            )
            .await?;
            tracing::debug!(
                mockup_id = mockup.id,
                stage_order,
                "Stage auto-approved on entry (no reviewers assigned)"
            );
            stage_order += 1;
            continue;
        }

        let row = StageProgressRepo::create(
            &mut *conn,
            &CreateStageProgress {
                mockup_id: mockup.id,
                project_id: Some(project_id),
                stage_order,
                stage_name: stage.name.clone(),
                stage_color: stage.color.clone(),
                status_id: ProgressStatus::InReview.id(),
                approvals_required,
            },
        )
        .await?;

        return Ok(EntryOutcome { current: Some(row) });
    }
}

impl ApprovalEngine {
    /// Move a mockup into review.
    ///
    /// For a project with a workflow this creates the stage-1 ledger row
    /// (cascading past zero-quorum stages). A mockup without a project or
    /// workflow gets a single synthetic stage-0 row that closes immediately,
    /// leaving it at the final-approval gate — the ledger stays the sole
    /// source of review state either way.
    ///
    /// Only the mockup's creator or an organization admin may start review.
    pub async fn start_review(
        &self,
        mockup_id: DbId,
        actor_id: DbId,
    ) -> Result<ReviewState, EngineError> {
        let mockup = MockupRepo::find_by_id(&self.pool, mockup_id)
            .await?
            .ok_or(EngineError::NotFound {
                entity: "Mockup",
                id: mockup_id,
            })?;

        if mockup.is_finalized() {
            return Err(EngineError::AlreadyFinalized { mockup_id });
        }

        if actor_id != mockup.created_by
            && !UserRepo::is_admin(&self.pool, actor_id, mockup.org_id).await?
        {
            return Err(EngineError::Forbidden(
                "Only the mockup's creator or an admin may start review".to_string(),
            ));
        }

        let workflow = match mockup.project_id {
            Some(project_id) => {
                let project = ProjectRepo::find_by_id(&self.pool, project_id)
                    .await?
                    .ok_or(EngineError::NotFound {
                        entity: "Project",
                        id: project_id,
                    })?;
                project.workflow_id.map(|wf| (project_id, wf))
            }
            None => None,
        };

        let stages = match workflow {
            Some((project_id, workflow_id)) => {
                let stages = WorkflowRepo::stages(&self.pool, workflow_id).await?;
                if stages.is_empty() {
                    return Err(EngineError::Conflict(format!(
                        "Workflow {workflow_id} defines no stages"
                    )));
                }
                Some((project_id, stages))
            }
            None => None,
        };

        let mut tx = self.pool.begin().await?;

        let (total, _) = StageProgressRepo::review_summary(&mut *tx, mockup_id).await?;
        if total > 0 {
            return Err(EngineError::Conflict(
                "Review has already started for this mockup".to_string(),
            ));
        }

        let current = match &stages {
            Some((project_id, stages)) => {
                enter_stage(&mut tx, &mockup, *project_id, stages, 1)
                    .await?
                    .current
            }
            None => {
                // Zero-stage workflow: a synthetic closed row records that
                // review happened and puts the mockup at the final gate.
                StageProgressRepo::create(
                    &mut *tx,
                    &CreateStageProgress {
                        mockup_id,
                        project_id: mockup.project_id,
                        stage_order: 0,
                        stage_name: ZERO_STAGE_NAME.to_string(),
                        stage_color: ZERO_STAGE_COLOR.to_string(),
                        status_id: ProgressStatus::Approved.id(),
                        approvals_required: 0,
                    },
                )
                .await?;
                None
            }
        };

        tx.commit().await?;

        tracing::info!(
            mockup_id,
            actor_id,
            in_review = current.is_some(),
            "Review started"
        );

        match &current {
            Some(row) => {
                fanout::notify_review_started(&self.pool, &self.bus, &mockup, row).await;
            }
            None => {
                fanout::notify_awaiting_final_approval(&self.pool, &self.bus, &mockup).await;
            }
        }

        let status = match &current {
            Some(_) => ProgressStatus::InReview,
            None => ProgressStatus::PendingFinalApproval,
        };
        Ok(ReviewState {
            mockup,
            status: status.name(),
            current_stage: current,
        })
    }

    /// Resubmit a mockup after a changes request.
    ///
    /// Only the mockup's creator may resubmit. The existing ledger row is
    /// reused: its status flips back to `in_review`, the counter re-zeroes,
    /// and the review round increments so earlier decisions no longer count.
    pub async fn resubmit(
        &self,
        mockup_id: DbId,
        actor_id: DbId,
    ) -> Result<StageProgress, EngineError> {
        let mockup = MockupRepo::find_by_id(&self.pool, mockup_id)
            .await?
            .ok_or(EngineError::NotFound {
                entity: "Mockup",
                id: mockup_id,
            })?;

        if actor_id != mockup.created_by {
            return Err(EngineError::Forbidden(
                "Only the mockup's creator may resubmit".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let open = StageProgressRepo::lock_open(&mut *tx, mockup_id)
            .await?
            .ok_or_else(|| {
                EngineError::Conflict("Mockup has no stage awaiting changes".to_string())
            })?;

        if open.status_id != ProgressStatus::ChangesRequested.id() {
            return Err(EngineError::Conflict(
                "Current stage is not awaiting changes".to_string(),
            ));
        }

        let reopened = StageProgressRepo::reopen_for_review(&mut *tx, open.id).await?;

        tx.commit().await?;

        tracing::info!(
            mockup_id,
            stage_order = reopened.stage_order,
            review_round = reopened.review_round,
            "Mockup resubmitted for review"
        );

        fanout::notify_resubmitted(&self.pool, &self.bus, &mockup, &reopened).await;

        Ok(reopened)
    }
}
