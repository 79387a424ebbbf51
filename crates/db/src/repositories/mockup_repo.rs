//! Repository for the `mockups` table.

use mockdeck_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::mockup::{CreateMockup, Mockup};

/// Column list for `mockups` queries.
const COLUMNS: &str = "\
    id, org_id, project_id, created_by, title, \
    final_approved_by, final_approved_at, final_approval_notes, \
    created_at, updated_at";

/// Provides CRUD operations for mockups.
pub struct MockupRepo;

impl MockupRepo {
    /// Insert a new mockup, returning the created row.
    pub async fn create(
        pool: &PgPool,
        org_id: DbId,
        created_by: DbId,
        input: &CreateMockup,
    ) -> Result<Mockup, sqlx::Error> {
        let query = format!(
            "INSERT INTO mockups (org_id, project_id, created_by, title) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Mockup>(&query)
            .bind(org_id)
            .bind(input.project_id)
            .bind(created_by)
            .bind(&input.title)
            .fetch_one(pool)
            .await
    }

    /// Find a mockup by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Mockup>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM mockups WHERE id = $1");
        sqlx::query_as::<_, Mockup>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's mockups, newest first.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Mockup>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM mockups \
             WHERE project_id = $1 \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Mockup>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Conditionally finalize a mockup.
    ///
    /// The `final_approved_by IS NULL` guard makes the terminal transition
    /// one-way without a row lock: on an already-finalized mockup no row
    /// matches and `None` is returned, which the engine maps to
    /// `AlreadyFinalized`.
    pub async fn grant_final_approval(
        conn: &mut PgConnection,
        mockup_id: DbId,
        approver_id: DbId,
        notes: Option<&str>,
    ) -> Result<Option<Mockup>, sqlx::Error> {
        let query = format!(
            "UPDATE mockups \
             SET final_approved_by = $2, final_approved_at = NOW(), \
                 final_approval_notes = $3, updated_at = NOW() \
             WHERE id = $1 AND final_approved_by IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Mockup>(&query)
            .bind(mockup_id)
            .bind(approver_id)
            .bind(notes)
            .fetch_optional(conn)
            .await
    }
}
