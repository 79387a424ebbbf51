//! Authentication handlers.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use mockdeck_core::error::CoreError;
use mockdeck_db::models::user::UserWithRole;
use mockdeck_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::mint_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response payload for a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserWithRole,
}

/// POST /api/v1/auth/login
///
/// Verify credentials and issue an access token. Invalid email and invalid
/// password produce the same error so accounts cannot be enumerated.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let invalid =
        || AppError::Core(CoreError::Unauthorized("Invalid email or password".into()));

    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(invalid)?;

    let matches = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")))?;
    if !matches {
        return Err(invalid());
    }

    let token = mint_token(&user, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = user.id, org_id = user.org_id, "User logged in");

    Ok(DataResponse::new(LoginResponse { token, user }))
}
