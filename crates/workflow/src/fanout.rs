//! Notification fan-out for review transitions.
//!
//! Each transition resolves its audience, writes their notification rows in
//! one batched insert, and only then publishes the [`ReviewEvent`] that the
//! archiver and delivery worker consume — so a transport failure can never
//! lose the notification itself. Everything here runs after the triggering
//! transaction has committed and is fail-open: errors are logged and
//! swallowed, never propagated back into the transition.

use mockdeck_core::channels::CHANNEL_IN_APP;
use mockdeck_core::types::DbId;
use mockdeck_db::models::mockup::Mockup;
use mockdeck_db::models::notification::NewNotification;
use mockdeck_db::models::stage_progress::StageProgress;
use mockdeck_db::repositories::{NotificationRepo, ProjectRepo, ReviewerRepo};
use mockdeck_db::DbPool;
use mockdeck_events::{ReviewEvent, ReviewEventBus, ReviewEventKind};

/// A mockup entered its first review stage: tell that stage's reviewers.
pub(crate) async fn notify_review_started(
    pool: &DbPool,
    bus: &ReviewEventBus,
    mockup: &Mockup,
    stage: &StageProgress,
) {
    let recipients = stage_reviewers(pool, stage).await;
    let event = ReviewEvent::new(
        ReviewEventKind::ReviewStarted,
        mockup.org_id,
        mockup.id,
        mockup.title.as_str(),
    )
    .summary(
        format!("\"{}\" is ready for review", mockup.title),
        format!(
            "Stage {} ({}) is collecting approvals.",
            stage.stage_order, stage.stage_name
        ),
    )
    .at_stage(stage.stage_order, stage.stage_name.as_str());
    dispatch(pool, bus, mockup, event, recipients).await;
}

/// A stage closed and the next one opened: tell the next stage's reviewers.
pub(crate) async fn notify_stage_advanced(
    pool: &DbPool,
    bus: &ReviewEventBus,
    mockup: &Mockup,
    next_stage: &StageProgress,
) {
    let recipients = stage_reviewers(pool, next_stage).await;
    let event = ReviewEvent::new(
        ReviewEventKind::StageAdvanced,
        mockup.org_id,
        mockup.id,
        mockup.title.as_str(),
    )
    .summary(
        format!("\"{}\" advanced to {}", mockup.title, next_stage.stage_name),
        format!(
            "Stage {} ({}) is now collecting approvals.",
            next_stage.stage_order, next_stage.stage_name
        ),
    )
    .at_stage(next_stage.stage_order, next_stage.stage_name.as_str());
    dispatch(pool, bus, mockup, event, recipients).await;
}

/// The creator resubmitted after changes: tell the stage's reviewers.
pub(crate) async fn notify_resubmitted(
    pool: &DbPool,
    bus: &ReviewEventBus,
    mockup: &Mockup,
    stage: &StageProgress,
) {
    let recipients = stage_reviewers(pool, stage).await;
    let event = ReviewEvent::new(
        ReviewEventKind::Resubmitted,
        mockup.org_id,
        mockup.id,
        mockup.title.as_str(),
    )
    .summary(
        format!("\"{}\" was resubmitted", mockup.title),
        format!(
            "Stage {} ({}) needs a fresh round of approvals.",
            stage.stage_order, stage.stage_name
        ),
    )
    .at_stage(stage.stage_order, stage.stage_name.as_str());
    dispatch(pool, bus, mockup, event, recipients).await;
}

/// A reviewer requested changes: tell the mockup's creator.
pub(crate) async fn notify_changes_requested(
    pool: &DbPool,
    bus: &ReviewEventBus,
    mockup: &Mockup,
    stage: &StageProgress,
) {
    let message = match &stage.notes {
        Some(notes) => format!("Changes requested at {}: {}", stage.stage_name, notes),
        None => format!("Changes requested at {}.", stage.stage_name),
    };
    let event = ReviewEvent::new(
        ReviewEventKind::ChangesRequested,
        mockup.org_id,
        mockup.id,
        mockup.title.as_str(),
    )
    .summary(
        format!("Changes requested on \"{}\"", mockup.title),
        message,
    )
    .at_stage(stage.stage_order, stage.stage_name.as_str());
    dispatch(pool, bus, mockup, event, vec![mockup.created_by]).await;
}

/// Every stage closed: tell the project owner the final gate is open.
pub(crate) async fn notify_awaiting_final_approval(
    pool: &DbPool,
    bus: &ReviewEventBus,
    mockup: &Mockup,
) {
    let owner = project_owner(pool, mockup).await;
    let event = ReviewEvent::new(
        ReviewEventKind::AwaitingFinalApproval,
        mockup.org_id,
        mockup.id,
        mockup.title.as_str(),
    )
    .summary(
        format!("\"{}\" awaits final approval", mockup.title),
        "All review stages are complete. Final approval can now be granted.",
    );
    dispatch(pool, bus, mockup, event, vec![owner]).await;
}

/// The terminal gate was passed: tell the creator and every reviewer who
/// ever recorded a decision on the mockup.
pub(crate) async fn notify_final_approved(
    pool: &DbPool,
    bus: &ReviewEventBus,
    mockup: &Mockup,
    reviewer_ids: &[DbId],
) {
    let mut recipients = vec![mockup.created_by];
    recipients.extend_from_slice(reviewer_ids);
    let event = ReviewEvent::new(
        ReviewEventKind::FinalApproved,
        mockup.org_id,
        mockup.id,
        mockup.title.as_str(),
    )
    .summary(
        format!("\"{}\" was finalized", mockup.title),
        "The mockup received final approval.",
    );
    dispatch(pool, bus, mockup, event, recipients).await;
}

/// Resolve the reviewer set for a stage row, logging and returning empty on
/// failure.
async fn stage_reviewers(pool: &DbPool, stage: &StageProgress) -> Vec<DbId> {
    let Some(project_id) = stage.project_id else {
        return Vec::new();
    };
    let mut conn = match pool.acquire().await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to acquire connection for fan-out");
            return Vec::new();
        }
    };
    match ReviewerRepo::reviewers_for_stage(&mut conn, project_id, stage.stage_order).await {
        Ok(reviewers) => reviewers,
        Err(e) => {
            tracing::warn!(
                project_id,
                stage_order = stage.stage_order,
                error = %e,
                "Failed to resolve stage reviewers for fan-out"
            );
            Vec::new()
        }
    }
}

/// The user who owns the mockup's final gate: the project creator, or the
/// mockup creator when there is no project (or the lookup fails).
async fn project_owner(pool: &DbPool, mockup: &Mockup) -> DbId {
    let Some(project_id) = mockup.project_id else {
        return mockup.created_by;
    };
    match ProjectRepo::find_by_id(pool, project_id).await {
        Ok(Some(project)) => project.created_by,
        Ok(None) => mockup.created_by,
        Err(e) => {
            tracing::warn!(
                mockup_id = mockup.id,
                error = %e,
                "Failed to resolve project owner for fan-out"
            );
            mockup.created_by
        }
    }
}

/// Write the batched notification rows, then publish the event carrying
/// both the recipients and their row ids.
async fn dispatch(
    pool: &DbPool,
    bus: &ReviewEventBus,
    mockup: &Mockup,
    event: ReviewEvent,
    recipients: Vec<DbId>,
) {
    let mut recipient_ids = recipients;
    recipient_ids.sort_unstable();
    recipient_ids.dedup();

    let template = NewNotification {
        org_id: mockup.org_id,
        mockup_id: Some(mockup.id),
        kind: event.kind.as_str(),
        title: event.title.clone(),
        message: event.message.clone(),
        channel: CHANNEL_IN_APP,
    };

    let notification_ids = match pool.acquire().await {
        Ok(mut conn) => {
            match NotificationRepo::create_batch(&mut conn, &template, &recipient_ids).await {
                Ok(ids) => ids,
                Err(e) => {
                    tracing::warn!(
                        kind = template.kind,
                        mockup_id = mockup.id,
                        error = %e,
                        "Failed to write notification batch"
                    );
                    Vec::new()
                }
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to acquire connection for fan-out");
            Vec::new()
        }
    };

    let subscribers = bus.publish(event.notifying(recipient_ids, notification_ids));
    if subscribers == 0 {
        tracing::debug!(mockup_id = mockup.id, "No review event subscribers");
    }
}
