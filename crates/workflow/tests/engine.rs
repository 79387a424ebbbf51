//! Integration tests for the approval workflow engine.
//!
//! Exercises the full recorder → coordinator → final-approval path against a
//! real database: quorum counting, idempotent decisions, zero-quorum
//! cascades, changes-requested resets, the terminal gate, and the
//! concurrent-approval race.

use std::sync::Arc;

use assert_matches::assert_matches;
use mockdeck_core::decision::{DECISION_APPROVE, DECISION_REQUEST_CHANGES};
use mockdeck_core::stage_flow::TransitionKind;
use mockdeck_core::status::ProgressStatus;
use mockdeck_core::types::DbId;
use mockdeck_db::models::project::CreateProject;
use mockdeck_db::models::mockup::CreateMockup;
use mockdeck_db::models::reviewer::CreateAssignment;
use mockdeck_db::models::user::CreateUser;
use mockdeck_db::models::workflow::StageInput;
use mockdeck_db::repositories::{
    MockupRepo, NotificationRepo, OrganizationRepo, ProjectRepo, ReviewerRepo,
    StageProgressRepo, UserRepo, WorkflowRepo,
};
use mockdeck_events::ReviewEventBus;
use mockdeck_workflow::{ApprovalEngine, EngineError};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn engine(pool: &PgPool) -> ApprovalEngine {
    ApprovalEngine::new(pool.clone(), Arc::new(ReviewEventBus::default()))
}

async fn seed_org(pool: &PgPool, name: &str) -> DbId {
    OrganizationRepo::create(pool, name).await.unwrap().id
}

async fn seed_user(pool: &PgPool, org_id: DbId, email: &str, role: &str) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            org_id,
            email: email.to_string(),
            password_hash: "unused".to_string(),
            display_name: email.to_string(),
            role: role.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

fn stage(order: i32, name: &str) -> StageInput {
    StageInput {
        stage_order: order,
        name: name.to_string(),
        color: "#4488FF".to_string(),
    }
}

async fn seed_workflow(
    pool: &PgPool,
    org_id: DbId,
    created_by: DbId,
    stages: &[StageInput],
) -> DbId {
    WorkflowRepo::create(pool, org_id, created_by, "Brand review", stages)
        .await
        .unwrap()
        .workflow
        .id
}

async fn seed_project(
    pool: &PgPool,
    org_id: DbId,
    created_by: DbId,
    workflow_id: Option<DbId>,
) -> DbId {
    ProjectRepo::create(
        pool,
        org_id,
        created_by,
        &CreateProject {
            name: "Spring campaign".to_string(),
            workflow_id,
        },
    )
    .await
    .unwrap()
    .id
}

async fn seed_mockup(pool: &PgPool, org_id: DbId, created_by: DbId, project_id: Option<DbId>) -> DbId {
    MockupRepo::create(
        pool,
        org_id,
        created_by,
        &CreateMockup {
            project_id,
            title: "Landing hero card".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

async fn assign(pool: &PgPool, project_id: DbId, user_id: DbId, stage_order: Option<i32>) {
    ReviewerRepo::assign(
        pool,
        project_id,
        &CreateAssignment {
            user_id,
            stage_order,
        },
    )
    .await
    .unwrap();
}

/// Two-stage workflow: stage 1 reviewed by `a` and `b`, stage 2 by `c`.
/// Returns (mockup_id, creator, a, b, c, admin).
async fn seed_two_stage_review(pool: &PgPool) -> (DbId, DbId, DbId, DbId, DbId, DbId) {
    let org = seed_org(pool, "Acme Studio").await;
    let admin = seed_user(pool, org, "admin@acme.test", "admin").await;
    let creator = seed_user(pool, org, "creator@acme.test", "designer").await;
    let a = seed_user(pool, org, "a@acme.test", "reviewer").await;
    let b = seed_user(pool, org, "b@acme.test", "reviewer").await;
    let c = seed_user(pool, org, "c@acme.test", "reviewer").await;

    let wf = seed_workflow(
        pool,
        org,
        admin,
        &[stage(1, "Concept"), stage(2, "Legal")],
    )
    .await;
    let project = seed_project(pool, org, creator, Some(wf)).await;
    assign(pool, project, a, Some(1)).await;
    assign(pool, project, b, Some(1)).await;
    assign(pool, project, c, Some(2)).await;

    let mockup = seed_mockup(pool, org, creator, Some(project)).await;
    (mockup, creator, a, b, c, admin)
}

// ---------------------------------------------------------------------------
// Full two-stage scenario
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn two_stage_scenario_runs_to_final_approval(pool: PgPool) {
    let (mockup, creator, a, b, c, admin) = seed_two_stage_review(&pool).await;
    let engine = engine(&pool);

    let state = engine.start_review(mockup, creator).await.unwrap();
    let stage1 = state.current_stage.expect("stage 1 should be in review");
    assert_eq!(stage1.stage_order, 1);
    assert_eq!(stage1.approvals_required, 2);
    assert_eq!(stage1.approvals_received, 0);
    assert_eq!(stage1.status_id, ProgressStatus::InReview.id());

    // First approval: quorum not yet met.
    let outcome = engine
        .record_decision(mockup, 1, a, DECISION_APPROVE, None)
        .await
        .unwrap();
    assert_eq!(outcome.transition, Some(TransitionKind::PartialApproval));
    assert_eq!(outcome.progress.approvals_received, 1);

    // Second approval closes stage 1 and opens stage 2.
    let outcome = engine
        .record_decision(mockup, 1, b, DECISION_APPROVE, None)
        .await
        .unwrap();
    assert_eq!(outcome.transition, Some(TransitionKind::StageAdvanced));
    assert_eq!(outcome.progress.status_id, ProgressStatus::Approved.id());
    let stage2 = outcome.next_stage.expect("stage 2 should open");
    assert_eq!(stage2.stage_order, 2);
    assert_eq!(stage2.approvals_required, 1);
    assert_eq!(stage2.approvals_received, 0);

    // Stage 2 quorum of one: the mockup reaches the final gate.
    let outcome = engine
        .record_decision(mockup, 2, c, DECISION_APPROVE, None)
        .await
        .unwrap();
    assert_eq!(
        outcome.transition,
        Some(TransitionKind::AwaitingFinalApproval)
    );

    let state = engine.current_progress(mockup).await.unwrap();
    assert_eq!(state.status, "pending_final_approval");
    assert!(!state.mockup.is_finalized());

    // Only the explicit gate finalizes.
    let finalized = engine
        .grant_final_approval(mockup, admin, Some("Ship it".to_string()))
        .await
        .unwrap();
    assert_eq!(finalized.final_approved_by, Some(admin));
    assert!(finalized.final_approved_at.is_some());
    assert_eq!(finalized.final_approval_notes.as_deref(), Some("Ship it"));

    let state = engine.current_progress(mockup).await.unwrap();
    assert_eq!(state.status, "final_approved");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stage_advance_notifies_next_reviewers_and_final_notifies_everyone(pool: PgPool) {
    let (mockup, creator, a, b, c, admin) = seed_two_stage_review(&pool).await;
    let engine = engine(&pool);

    engine.start_review(mockup, creator).await.unwrap();
    engine
        .record_decision(mockup, 1, a, DECISION_APPROVE, None)
        .await
        .unwrap();
    engine
        .record_decision(mockup, 1, b, DECISION_APPROVE, None)
        .await
        .unwrap();

    // Advancing to stage 2 notifies its reviewer.
    assert_eq!(NotificationRepo::unread_count(&pool, c).await.unwrap(), 1);

    engine
        .record_decision(mockup, 2, c, DECISION_APPROVE, None)
        .await
        .unwrap();
    engine
        .grant_final_approval(mockup, admin, None)
        .await
        .unwrap();

    // Terminal fan-out reaches the creator and every historical reviewer.
    assert!(NotificationRepo::unread_count(&pool, creator).await.unwrap() >= 1);
    assert!(NotificationRepo::unread_count(&pool, a).await.unwrap() >= 1);
    assert!(NotificationRepo::unread_count(&pool, b).await.unwrap() >= 1);
    assert!(NotificationRepo::unread_count(&pool, c).await.unwrap() >= 2);
}

// ---------------------------------------------------------------------------
// Idempotency
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn repeated_identical_decision_is_a_noop(pool: PgPool) {
    let (mockup, creator, a, _b, _c, _admin) = seed_two_stage_review(&pool).await;
    let engine = engine(&pool);

    engine.start_review(mockup, creator).await.unwrap();
    engine
        .record_decision(mockup, 1, a, DECISION_APPROVE, None)
        .await
        .unwrap();

    // Double-click: same reviewer, same decision, any number of times.
    for _ in 0..3 {
        let outcome = engine
            .record_decision(mockup, 1, a, DECISION_APPROVE, None)
            .await
            .unwrap();
        assert_eq!(outcome.transition, None);
        assert_eq!(outcome.progress.approvals_received, 1);
    }

    let row = StageProgressRepo::find_for_stage(&pool, mockup, 1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.approvals_received, 1);
    assert_eq!(row.status_id, ProgressStatus::InReview.id());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn changing_decision_replaces_the_prior_one(pool: PgPool) {
    let (mockup, creator, a, _b, _c, _admin) = seed_two_stage_review(&pool).await;
    let engine = engine(&pool);

    engine.start_review(mockup, creator).await.unwrap();
    engine
        .record_decision(mockup, 1, a, DECISION_APPROVE, None)
        .await
        .unwrap();

    // The reviewer changes their mind: the approval is withdrawn and the
    // stage resets rather than double-counting.
    let outcome = engine
        .record_decision(
            mockup,
            1,
            a,
            DECISION_REQUEST_CHANGES,
            Some("Logo is off-brand".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(outcome.transition, Some(TransitionKind::ChangesRequested));
    assert_eq!(outcome.progress.approvals_received, 0);
    assert_eq!(
        outcome.progress.notes.as_deref(),
        Some("Logo is off-brand")
    );

    let decisions = mockdeck_db::repositories::DecisionRepo::list_for_stage(&pool, mockup, 1)
        .await
        .unwrap();
    assert_eq!(decisions.len(), 1);
    assert_eq!(decisions[0].decision, DECISION_REQUEST_CHANGES);
}

// ---------------------------------------------------------------------------
// Zero-quorum stages
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn zero_quorum_stage_auto_advances_on_entry(pool: PgPool) {
    let org = seed_org(&pool, "Acme Studio").await;
    let admin = seed_user(&pool, org, "admin@acme.test", "admin").await;
    let creator = seed_user(&pool, org, "creator@acme.test", "designer").await;
    let reviewer = seed_user(&pool, org, "r@acme.test", "reviewer").await;

    let wf = seed_workflow(&pool, org, admin, &[stage(1, "Concept"), stage(2, "Legal")]).await;
    let project = seed_project(&pool, org, creator, Some(wf)).await;
    // Only stage 2 has a reviewer; stage 1 must close itself at entry.
    assign(&pool, project, reviewer, Some(2)).await;
    let mockup = seed_mockup(&pool, org, creator, Some(project)).await;

    let engine = engine(&pool);
    let state = engine.start_review(mockup, creator).await.unwrap();

    let current = state.current_stage.expect("stage 2 should be in review");
    assert_eq!(current.stage_order, 2);

    let stage1 = StageProgressRepo::find_for_stage(&pool, mockup, 1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stage1.status_id, ProgressStatus::Approved.id());
    assert_eq!(stage1.approvals_required, 0);
    assert_eq!(stage1.approvals_received, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn workflow_with_no_reviewers_goes_straight_to_final_gate(pool: PgPool) {
    let org = seed_org(&pool, "Acme Studio").await;
    let admin = seed_user(&pool, org, "admin@acme.test", "admin").await;
    let creator = seed_user(&pool, org, "creator@acme.test", "designer").await;

    let wf = seed_workflow(&pool, org, admin, &[stage(1, "Concept"), stage(2, "Legal")]).await;
    let project = seed_project(&pool, org, creator, Some(wf)).await;
    let mockup = seed_mockup(&pool, org, creator, Some(project)).await;

    let engine = engine(&pool);
    let state = engine.start_review(mockup, creator).await.unwrap();

    assert_eq!(state.status, "pending_final_approval");
    assert!(state.current_stage.is_none());

    let rows = StageProgressRepo::list_for_mockup(&pool, mockup).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows
        .iter()
        .all(|r| r.status_id == ProgressStatus::Approved.id()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn project_without_workflow_goes_straight_to_final_gate(pool: PgPool) {
    let org = seed_org(&pool, "Acme Studio").await;
    let creator = seed_user(&pool, org, "creator@acme.test", "designer").await;
    let project = seed_project(&pool, org, creator, None).await;
    let mockup = seed_mockup(&pool, org, creator, Some(project)).await;

    let engine = engine(&pool);
    let state = engine.start_review(mockup, creator).await.unwrap();

    assert_eq!(state.status, "pending_final_approval");

    // The synthetic ledger row keeps the audit trail uniform.
    let rows = StageProgressRepo::list_for_mockup(&pool, mockup).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].stage_order, 0);
    assert_eq!(rows[0].status_id, ProgressStatus::Approved.id());
}

// ---------------------------------------------------------------------------
// Changes requested and resubmission
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn request_changes_resets_counter_and_requires_full_rereview(pool: PgPool) {
    let (mockup, creator, a, b, _c, _admin) = seed_two_stage_review(&pool).await;
    let engine = engine(&pool);

    engine.start_review(mockup, creator).await.unwrap();
    engine
        .record_decision(mockup, 1, a, DECISION_APPROVE, None)
        .await
        .unwrap();

    let outcome = engine
        .record_decision(
            mockup,
            1,
            b,
            DECISION_REQUEST_CHANGES,
            Some("Wrong palette".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(outcome.transition, Some(TransitionKind::ChangesRequested));
    assert_eq!(outcome.progress.approvals_received, 0);
    assert_eq!(outcome.progress.stage_order, 1);
    assert_eq!(
        outcome.progress.status_id,
        ProgressStatus::ChangesRequested.id()
    );

    // No reviews are accepted while changes are pending.
    let err = engine
        .record_decision(mockup, 1, a, DECISION_APPROVE, None)
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::NotInReview { .. });

    // Resubmission reuses the row and starts a fresh round.
    let reopened = engine.resubmit(mockup, creator).await.unwrap();
    assert_eq!(reopened.stage_order, 1);
    assert_eq!(reopened.status_id, ProgressStatus::InReview.id());
    assert_eq!(reopened.approvals_received, 0);
    assert_eq!(reopened.review_round, 2);

    // A's earlier approval belonged to round 1 and must count again fresh.
    let outcome = engine
        .record_decision(mockup, 1, a, DECISION_APPROVE, None)
        .await
        .unwrap();
    assert_eq!(outcome.transition, Some(TransitionKind::PartialApproval));
    assert_eq!(outcome.progress.approvals_received, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_the_creator_may_resubmit(pool: PgPool) {
    let (mockup, creator, a, b, _c, _admin) = seed_two_stage_review(&pool).await;
    let engine = engine(&pool);

    engine.start_review(mockup, creator).await.unwrap();
    engine
        .record_decision(mockup, 1, b, DECISION_REQUEST_CHANGES, None)
        .await
        .unwrap();

    let err = engine.resubmit(mockup, a).await.unwrap_err();
    assert_matches!(err, EngineError::Forbidden(_));
}

// ---------------------------------------------------------------------------
// Authorization and preconditions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn unassigned_reviewer_is_rejected(pool: PgPool) {
    let (mockup, creator, _a, _b, c, _admin) = seed_two_stage_review(&pool).await;
    let engine = engine(&pool);

    engine.start_review(mockup, creator).await.unwrap();

    // C reviews stage 2, not stage 1.
    let err = engine
        .record_decision(mockup, 1, c, DECISION_APPROVE, None)
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::NotAuthorizedReviewer { .. });
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn decision_on_a_stage_not_yet_reached_fails(pool: PgPool) {
    let (mockup, creator, _a, _b, c, _admin) = seed_two_stage_review(&pool).await;
    let engine = engine(&pool);

    engine.start_review(mockup, creator).await.unwrap();

    let err = engine
        .record_decision(mockup, 2, c, DECISION_APPROVE, None)
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::NotInReview { .. });
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn starting_review_twice_conflicts(pool: PgPool) {
    let (mockup, creator, _a, _b, _c, _admin) = seed_two_stage_review(&pool).await;
    let engine = engine(&pool);

    engine.start_review(mockup, creator).await.unwrap();
    let err = engine.start_review(mockup, creator).await.unwrap_err();
    assert_matches!(err, EngineError::Conflict(_));
}

// ---------------------------------------------------------------------------
// Final approval gate
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn final_approval_before_stages_close_fails(pool: PgPool) {
    let (mockup, creator, _a, _b, _c, admin) = seed_two_stage_review(&pool).await;
    let engine = engine(&pool);

    // Review not yet started.
    let err = engine
        .grant_final_approval(mockup, admin, None)
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::NotReadyForFinal { .. });

    // Started but stage 1 still collecting.
    engine.start_review(mockup, creator).await.unwrap();
    let err = engine
        .grant_final_approval(mockup, admin, None)
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::NotReadyForFinal { .. });
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn final_approval_is_restricted_and_one_way(pool: PgPool) {
    let (mockup, creator, a, b, c, admin) = seed_two_stage_review(&pool).await;
    let engine = engine(&pool);

    engine.start_review(mockup, creator).await.unwrap();
    for reviewer in [a, b] {
        engine
            .record_decision(mockup, 1, reviewer, DECISION_APPROVE, None)
            .await
            .unwrap();
    }
    engine
        .record_decision(mockup, 2, c, DECISION_APPROVE, None)
        .await
        .unwrap();

    // A reviewer is neither the project creator nor an admin.
    let err = engine
        .grant_final_approval(mockup, c, None)
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::Forbidden(_));

    engine
        .grant_final_approval(mockup, admin, None)
        .await
        .unwrap();

    // The gate is one-way: a second call is a distinct error, not a no-op.
    let err = engine
        .grant_final_approval(mockup, creator, None)
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::AlreadyFinalized { .. });
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn project_creator_may_finalize_without_admin_role(pool: PgPool) {
    let org = seed_org(&pool, "Acme Studio").await;
    let creator = seed_user(&pool, org, "creator@acme.test", "designer").await;
    let project = seed_project(&pool, org, creator, None).await;
    let mockup = seed_mockup(&pool, org, creator, Some(project)).await;

    let engine = engine(&pool);
    engine.start_review(mockup, creator).await.unwrap();
    let finalized = engine
        .grant_final_approval(mockup, creator, None)
        .await
        .unwrap();
    assert_eq!(finalized.final_approved_by, Some(creator));
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_approvals_advance_the_stage_exactly_once(pool: PgPool) {
    const QUORUM: usize = 4;

    let org = seed_org(&pool, "Acme Studio").await;
    let admin = seed_user(&pool, org, "admin@acme.test", "admin").await;
    let creator = seed_user(&pool, org, "creator@acme.test", "designer").await;

    let wf = seed_workflow(&pool, org, admin, &[stage(1, "Concept")]).await;
    let project = seed_project(&pool, org, creator, Some(wf)).await;

    let mut reviewers = Vec::with_capacity(QUORUM);
    for i in 0..QUORUM {
        let id = seed_user(&pool, org, &format!("r{i}@acme.test"), "reviewer").await;
        assign(&pool, project, id, Some(1)).await;
        reviewers.push(id);
    }

    let mockup = seed_mockup(&pool, org, creator, Some(project)).await;
    let engine = engine(&pool);
    engine.start_review(mockup, creator).await.unwrap();

    let mut tasks = tokio::task::JoinSet::new();
    for reviewer in reviewers {
        let engine = engine.clone();
        tasks.spawn(async move {
            engine
                .record_decision(mockup, 1, reviewer, DECISION_APPROVE, None)
                .await
                .unwrap()
        });
    }

    let mut transitions = Vec::new();
    while let Some(outcome) = tasks.join_next().await {
        transitions.push(outcome.unwrap().transition);
    }

    // Exactly one reviewer observes the closing transition; the rest are
    // partial approvals. Never zero, never several.
    let advanced = transitions
        .iter()
        .filter(|t| **t == Some(TransitionKind::AwaitingFinalApproval))
        .count();
    let partial = transitions
        .iter()
        .filter(|t| **t == Some(TransitionKind::PartialApproval))
        .count();
    assert_eq!(advanced, 1);
    assert_eq!(partial, QUORUM - 1);

    let row = StageProgressRepo::find_for_stage(&pool, mockup, 1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.approvals_received, QUORUM as i32);
    assert_eq!(row.status_id, ProgressStatus::Approved.id());
}
