//! Repository for the `users` table.

use mockdeck_core::roles::ROLE_ADMIN;
use mockdeck_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User, UserWithRole};

/// Column list for `users` queries.
const COLUMNS: &str =
    "id, org_id, role_id, email, password_hash, display_name, created_at, updated_at";

/// Column list for user + role-name joins.
const JOINED_COLUMNS: &str =
    "u.id, u.org_id, u.email, u.password_hash, u.display_name, r.name AS role";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, resolving the role name to its `roles.id`.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (org_id, role_id, email, password_hash, display_name) \
             VALUES ($1, (SELECT id FROM roles WHERE name = $2), $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(input.org_id)
            .bind(&input.role)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.display_name)
            .fetch_one(pool)
            .await
    }

    /// Find a user by email, joined with their role name. Used by login.
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<UserWithRole>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM users u \
             JOIN roles r ON r.id = u.role_id \
             WHERE u.email = $1"
        );
        sqlx::query_as::<_, UserWithRole>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by ID, joined with their role name.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<UserWithRole>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM users u \
             JOIN roles r ON r.id = u.role_id \
             WHERE u.id = $1"
        );
        sqlx::query_as::<_, UserWithRole>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Look up email addresses for a set of user IDs.
    ///
    /// Used by the notification delivery worker; unknown IDs are skipped.
    pub async fn emails_for_ids(
        pool: &PgPool,
        user_ids: &[DbId],
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT email FROM users WHERE id = ANY($1) ORDER BY id ASC",
        )
        .bind(user_ids)
        .fetch_all(pool)
        .await
    }

    /// True if the user holds the admin role within the given organization.
    ///
    /// This guards the final-approval gate, so any lookup failure must
    /// propagate to the caller rather than default to `false`.
    pub async fn is_admin(pool: &PgPool, user_id: DbId, org_id: DbId) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS( \
                SELECT 1 FROM users u \
                JOIN roles r ON r.id = u.role_id \
                WHERE u.id = $1 AND u.org_id = $2 AND r.name = $3 \
             )",
        )
        .bind(user_id)
        .bind(org_id)
        .bind(ROLE_ADMIN)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }
}
