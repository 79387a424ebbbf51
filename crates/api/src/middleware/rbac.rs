//! Role guards for route handlers.
//!
//! Each guard wraps [`AuthUser`] and rejects callers whose role is not in
//! its allow-list, so authorization shows up in a handler's signature
//! rather than its body. Guards are stamped out by `define_role_guard!` —
//! add a line here when a new role combination is needed.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use mockdeck_core::error::CoreError;
use mockdeck_core::roles::{ROLE_ADMIN, ROLE_DESIGNER};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

macro_rules! define_role_guard {
    (
        $(#[$meta:meta])*
        $name:ident, $rejection:literal, [$($role:expr),+ $(,)?]
    ) => {
        $(#[$meta])*
        pub struct $name(pub AuthUser);

        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let user = AuthUser::from_request_parts(parts, state).await?;
                if ![$($role),+].contains(&user.role.as_str()) {
                    return Err(AppError::Core(CoreError::Forbidden($rejection.into())));
                }
                Ok($name(user))
            }
        }
    };
}

define_role_guard! {
    /// Admin-only operations: workflow management, reviewer assignment.
    ///
    /// ```ignore
    /// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
    ///     // user.role is guaranteed to be "admin" here
    ///     Ok(Json(()))
    /// }
    /// ```
    RequireAdmin, "Admin role required", [ROLE_ADMIN]
}

define_role_guard! {
    /// Content creation: mockups and projects. Admins qualify too.
    RequireDesigner, "Designer or Admin role required", [ROLE_ADMIN, ROLE_DESIGNER]
}
