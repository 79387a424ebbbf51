//! Integration tests for the review workflow endpoints.
//!
//! Drives the approval workflow end-to-end over HTTP: workflow and project
//! setup, starting review, recording decisions, and the final-approval gate.

mod common;

use axum::http::StatusCode;
use common::{expect_status, get_auth, post_json, token_for};
use mockdeck_core::types::DbId;
use mockdeck_db::models::user::CreateUser;
use mockdeck_db::repositories::{OrganizationRepo, UserRepo};
use serde_json::json;
use sqlx::PgPool;

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

/// Seed an org with an admin, a designer, and two reviewers.
/// Returns (org, admin, designer, reviewer_a, reviewer_b) ids.
async fn seed_users(pool: &PgPool) -> (DbId, DbId, DbId, DbId, DbId) {
    let org = OrganizationRepo::create(pool, "Acme Studio").await.unwrap().id;
    let admin = seed_user(pool, org, "admin@acme.test", "admin").await;
    let designer = seed_user(pool, org, "designer@acme.test", "designer").await;
    let a = seed_user(pool, org, "a@acme.test", "reviewer").await;
    let b = seed_user(pool, org, "b@acme.test", "reviewer").await;
    (org, admin, designer, a, b)
}

// ---------------------------------------------------------------------------
// Full flow over HTTP
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn review_flow_from_workflow_creation_to_final_approval(pool: PgPool) {
    let (org, admin, designer, a, b) = seed_users(&pool).await;
    let admin_token = token_for(admin, org, "admin");
    let designer_token = token_for(designer, org, "designer");

    // Admin defines a single-stage workflow with a two-reviewer quorum.
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/workflows",
        &admin_token,
        json!({
            "name": "Brand review",
            "stages": [{ "stage_order": 1, "name": "Concept", "color": "#4488FF" }],
        }),
    )
    .await;
    let body = expect_status(response, StatusCode::CREATED).await;
    let workflow_id = body["data"]["id"].as_i64().unwrap();

    // Designer creates the project bound to that workflow.
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/projects",
        &designer_token,
        json!({ "name": "Spring campaign", "workflow_id": workflow_id }),
    )
    .await;
    let body = expect_status(response, StatusCode::CREATED).await;
    let project_id = body["data"]["id"].as_i64().unwrap();

    // Admin assigns both reviewers to stage 1.
    for reviewer in [a, b] {
        let response = post_json(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/projects/{project_id}/reviewers"),
            &admin_token,
            json!({ "user_id": reviewer, "stage_order": 1 }),
        )
        .await;
        expect_status(response, StatusCode::CREATED).await;
    }

    // Designer creates a mockup and submits it for review.
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/mockups",
        &designer_token,
        json!({ "project_id": project_id, "title": "Landing hero card" }),
    )
    .await;
    let body = expect_status(response, StatusCode::CREATED).await;
    let mockup_id = body["data"]["id"].as_i64().unwrap();

    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/mockups/{mockup_id}/start-review"),
        &designer_token,
        json!({}),
    )
    .await;
    let body = expect_status(response, StatusCode::CREATED).await;
    assert_eq!(body["data"]["status"], "in_review");
    assert_eq!(body["data"]["current_stage"]["approvals_required"], 2);

    // First approval: partial.
    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/mockups/{mockup_id}/stages/1/approve"),
        &token_for(a, org, "reviewer"),
        json!({}),
    )
    .await;
    let body = expect_status(response, StatusCode::CREATED).await;
    assert_eq!(body["data"]["transition"], "partial_approval");

    // Second approval closes the last stage: awaiting final approval.
    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/mockups/{mockup_id}/stages/1/approve"),
        &token_for(b, org, "reviewer"),
        json!({}),
    )
    .await;
    let body = expect_status(response, StatusCode::CREATED).await;
    assert_eq!(body["data"]["transition"], "awaiting_final_approval");

    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/mockups/{mockup_id}/progress"),
        &designer_token,
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["status"], "pending_final_approval");

    // Admin passes the terminal gate.
    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/mockups/{mockup_id}/final-approval"),
        &admin_token,
        json!({ "note": "Ship it" }),
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["final_approved_by"], admin);

    // A second finalization attempt is a 409, not a silent success.
    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/mockups/{mockup_id}/final-approval"),
        &admin_token,
        json!({}),
    )
    .await;
    let body = expect_status(response, StatusCode::CONFLICT).await;
    assert_eq!(body["code"], "ALREADY_FINALIZED");
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn workflow_creation_requires_admin(pool: PgPool) {
    let (org, _admin, designer, _a, _b) = seed_users(&pool).await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/workflows",
        &token_for(designer, org, "designer"),
        json!({
            "name": "Brand review",
            "stages": [{ "stage_order": 1, "name": "Concept", "color": "#4488FF" }],
        }),
    )
    .await;
    expect_status(response, StatusCode::FORBIDDEN).await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_stage_orders_are_rejected(pool: PgPool) {
    let (org, admin, _designer, _a, _b) = seed_users(&pool).await;

    // Orders must be contiguous from 1.
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/workflows",
        &token_for(admin, org, "admin"),
        json!({
            "name": "Brand review",
            "stages": [
                { "stage_order": 1, "name": "Concept", "color": "#4488FF" },
                { "stage_order": 3, "name": "Legal", "color": "#FF8844" },
            ],
        }),
    )
    .await;
    let body = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn decision_on_unstarted_review_maps_to_conflict(pool: PgPool) {
    let (org, _admin, designer, a, _b) = seed_users(&pool).await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/mockups",
        &token_for(designer, org, "designer"),
        json!({ "project_id": null, "title": "Orphan mockup" }),
    )
    .await;
    let body = expect_status(response, StatusCode::CREATED).await;
    let mockup_id = body["data"]["id"].as_i64().unwrap();

    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/mockups/{mockup_id}/stages/1/approve"),
        &token_for(a, org, "reviewer"),
        json!({}),
    )
    .await;
    let body = expect_status(response, StatusCode::CONFLICT).await;
    assert_eq!(body["code"], "NOT_IN_REVIEW");
}
