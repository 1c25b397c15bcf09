//! Staff profile model.
//!
//! Accounts live at the external identity service; `profile` rows mirror
//! them with the back-office role. The row id equals the identity-service
//! user id (the `sub` claim of access tokens).

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Valid profile roles.
pub const VALID_ROLES: &[&str] = &["admin", "editor", "viewer"];

/// Staff profile record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    /// One of [`VALID_ROLES`].
    pub role: String,
    pub created: DateTime<Utc>,
}

impl Profile {
    /// Find a profile by identity-service user id.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profile WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .context("failed to fetch profile by id")?;

        Ok(profile)
    }

    /// List all profiles ordered by email.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>> {
        let profiles = sqlx::query_as::<_, Profile>("SELECT * FROM profile ORDER BY email")
            .fetch_all(pool)
            .await
            .context("failed to list profiles")?;

        Ok(profiles)
    }

    /// Whether this profile may use the back office at all.
    pub fn can_edit(&self) -> bool {
        matches!(self.role.as_str(), "admin" | "editor")
    }

    /// Whether this profile has full administrative access.
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}
