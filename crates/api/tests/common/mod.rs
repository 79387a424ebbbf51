use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mockdeck_api::auth::jwt::{mint_token, JwtConfig};
use mockdeck_api::config::ServerConfig;
use mockdeck_api::router;
use mockdeck_api::state::AppState;
use mockdeck_core::types::DbId;
use mockdeck_db::models::user::UserWithRole;
use mockdeck_events::ReviewEventBus;
use mockdeck_workflow::ApprovalEngine;
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout: Duration::from_secs(30),
        jwt: JwtConfig {
            secret: "test-secret-not-for-production".to_string(),
            token_ttl_mins: 60,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// This goes through `router::app` so integration tests exercise the same
/// request pipeline (CORS, request ID, timeout, tracing, panic recovery)
/// that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let event_bus = Arc::new(ReviewEventBus::default());
    let engine = ApprovalEngine::new(pool.clone(), Arc::clone(&event_bus));

    router::app(AppState {
        pool,
        config: Arc::new(test_config()),
        event_bus,
        engine,
    })
}

/// Issue a test access token carrying the given user, org, and role claims.
pub fn token_for(user_id: DbId, org_id: DbId, role: &str) -> String {
    let user = UserWithRole {
        id: user_id,
        org_id,
        email: format!("user{user_id}@acme.test"),
        password_hash: String::new(),
        display_name: format!("User {user_id}"),
        role: role.to_string(),
    };
    mint_token(&user, &test_config().jwt).expect("token minting")
}

/// Send a GET request without authentication.
pub async fn get(app: Router, path: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(path)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a GET request with a Bearer token.
pub async fn get_auth(app: Router, path: &str, token: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(path)
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a POST request with a Bearer token and JSON body.
pub async fn post_json(
    app: Router,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(path)
            .header("authorization", format!("Bearer {token}"))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send an unauthenticated POST request with a JSON body.
pub async fn post_json_public(app: Router, path: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body into parsed JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
}

/// Assert a response status and return the parsed body.
pub async fn expect_status(response: Response<Body>, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}
