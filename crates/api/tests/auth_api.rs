//! Integration tests for login and token handling.

mod common;

use axum::http::StatusCode;
use common::{expect_status, get_auth, post_json_public};
use mockdeck_api::auth::password::hash_password;
use mockdeck_db::models::user::CreateUser;
use mockdeck_db::repositories::{OrganizationRepo, UserRepo};
use serde_json::json;
use sqlx::PgPool;

async fn seed_designer(pool: &PgPool, password: &str) -> i64 {
    let org = OrganizationRepo::create(pool, "Acme Studio").await.unwrap().id;
    UserRepo::create(
        pool,
        &CreateUser {
            org_id: org,
            email: "designer@acme.test".to_string(),
            password_hash: hash_password(password).unwrap(),
            display_name: "Designer".to_string(),
            role: "designer".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_issues_a_working_token(pool: PgPool) {
    seed_designer(&pool, "correct horse battery").await;

    let response = post_json_public(
        common::build_test_app(pool.clone()),
        "/api/v1/auth/login",
        json!({ "email": "designer@acme.test", "password": "correct horse battery" }),
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;

    let token = body["data"]["token"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["user"]["role"], "designer");
    // The hash must never serialize into a response.
    assert!(body["data"]["user"].get("password_hash").is_none());

    // The issued token authenticates follow-up requests.
    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/notifications",
        &token,
    )
    .await;
    expect_status(response, StatusCode::OK).await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn wrong_password_and_unknown_email_look_identical(pool: PgPool) {
    seed_designer(&pool, "correct horse battery").await;

    let wrong_password = post_json_public(
        common::build_test_app(pool.clone()),
        "/api/v1/auth/login",
        json!({ "email": "designer@acme.test", "password": "nope" }),
    )
    .await;
    let body_a = expect_status(wrong_password, StatusCode::UNAUTHORIZED).await;

    let unknown_email = post_json_public(
        common::build_test_app(pool.clone()),
        "/api/v1/auth/login",
        json!({ "email": "nobody@acme.test", "password": "nope" }),
    )
    .await;
    let body_b = expect_status(unknown_email, StatusCode::UNAUTHORIZED).await;

    // No account enumeration: both failures carry the same message.
    assert_eq!(body_a["error"], body_b["error"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn garbage_token_is_rejected(pool: PgPool) {
    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/notifications",
        "not-a-jwt",
    )
    .await;
    expect_status(response, StatusCode::UNAUTHORIZED).await;
}
