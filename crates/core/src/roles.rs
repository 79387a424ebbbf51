//! Well-known role name constants.
//!
//! These must match the seed data in `20260301000002_create_roles_table.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_DESIGNER: &str = "designer";
pub const ROLE_REVIEWER: &str = "reviewer";

/// Roles that may record review decisions on a stage with no explicit
/// reviewer assignment list.
pub const REVIEW_CAPABLE_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_DESIGNER, ROLE_REVIEWER];
