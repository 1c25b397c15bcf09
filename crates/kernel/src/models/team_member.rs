//! Team member model and CRUD operations.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Team member record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TeamMember {
    pub id: Uuid,
    pub name: String,
    /// Job title, French base text.
    pub role_fr: String,
    pub role_en: Option<String>,
    pub bio_fr: Option<String>,
    pub bio_en: Option<String>,
    pub photo_url: Option<String>,
    /// Sort weight for display ordering.
    pub weight: i32,
    pub created: DateTime<Utc>,
    pub changed: DateTime<Utc>,
}

/// Input for creating a team member.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeamMember {
    pub name: String,
    pub role_fr: String,
    pub role_en: Option<String>,
    pub bio_fr: Option<String>,
    pub bio_en: Option<String>,
    pub photo_url: Option<String>,
    pub weight: Option<i32>,
}

/// Input for updating a team member.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTeamMember {
    pub name: Option<String>,
    pub role_fr: Option<String>,
    pub role_en: Option<String>,
    pub bio_fr: Option<String>,
    pub bio_en: Option<String>,
    pub photo_url: Option<String>,
    pub weight: Option<i32>,
}

impl CreateTeamMember {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("name must not be empty");
        }
        if self.role_fr.trim().is_empty() {
            anyhow::bail!("role_fr must not be empty");
        }
        Ok(())
    }
}

impl UpdateTeamMember {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            anyhow::bail!("name must not be empty");
        }
        if let Some(role) = &self.role_fr
            && role.trim().is_empty()
        {
            anyhow::bail!("role_fr must not be empty");
        }
        Ok(())
    }
}

impl TeamMember {
    /// List all team members ordered by weight, then name.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>> {
        let members =
            sqlx::query_as::<_, TeamMember>("SELECT * FROM team_member ORDER BY weight, name")
                .fetch_all(pool)
                .await
                .context("failed to list team members")?;

        Ok(members)
    }

    /// Find a team member by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let member = sqlx::query_as::<_, TeamMember>("SELECT * FROM team_member WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .context("failed to fetch team member by id")?;

        Ok(member)
    }

    /// Create a team member.
    pub async fn create(pool: &PgPool, input: CreateTeamMember) -> Result<Self> {
        let member = sqlx::query_as::<_, TeamMember>(
            r#"
            INSERT INTO team_member (
                id, name, role_fr, role_en, bio_fr, bio_en, photo_url, weight, created, changed
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.name.trim())
        .bind(input.role_fr.trim())
        .bind(&input.role_en)
        .bind(&input.bio_fr)
        .bind(&input.bio_en)
        .bind(&input.photo_url)
        .bind(input.weight.unwrap_or(0))
        .fetch_one(pool)
        .await
        .context("failed to create team member")?;

        Ok(member)
    }

    /// Update a team member. Returns None if it does not exist.
    pub async fn update(pool: &PgPool, id: Uuid, input: UpdateTeamMember) -> Result<Option<Self>> {
        let member = sqlx::query_as::<_, TeamMember>(
            r#"
            UPDATE team_member SET
                name = COALESCE($2, name),
                role_fr = COALESCE($3, role_fr),
                role_en = COALESCE($4, role_en),
                bio_fr = COALESCE($5, bio_fr),
                bio_en = COALESCE($6, bio_en),
                photo_url = COALESCE($7, photo_url),
                weight = COALESCE($8, weight),
                changed = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.role_fr)
        .bind(&input.role_en)
        .bind(&input.bio_fr)
        .bind(&input.bio_en)
        .bind(&input.photo_url)
        .bind(input.weight)
        .fetch_optional(pool)
        .await
        .context("failed to update team member")?;

        Ok(member)
    }

    /// Delete a team member.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM team_member WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete team member")?;

        Ok(result.rows_affected() > 0)
    }

    /// Localized role label for a request language.
    pub fn role(&self, language: &str) -> &str {
        crate::models::localized(&self.role_fr, self.role_en.as_deref(), language)
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn validate_requires_name_and_role() {
        let input = CreateTeamMember {
            name: "Claire Moreau".to_string(),
            role_fr: "Parfumeuse".to_string(),
            role_en: Some("Perfumer".to_string()),
            bio_fr: None,
            bio_en: None,
            photo_url: None,
            weight: None,
        };
        assert!(input.validate().is_ok());

        let missing_name = CreateTeamMember {
            name: " ".to_string(),
            ..input.clone()
        };
        assert!(missing_name.validate().is_err());

        let missing_role = CreateTeamMember {
            role_fr: String::new(),
            ..input
        };
        assert!(missing_role.validate().is_err());
    }

    #[test]
    fn role_localization() {
        let member = TeamMember {
            id: Uuid::new_v4(),
            name: "Claire Moreau".to_string(),
            role_fr: "Parfumeuse".to_string(),
            role_en: Some("Perfumer".to_string()),
            bio_fr: None,
            bio_en: None,
            photo_url: None,
            weight: 0,
            created: Utc::now(),
            changed: Utc::now(),
        };

        assert_eq!(member.role("fr"), "Parfumeuse");
        assert_eq!(member.role("en"), "Perfumer");
    }
}
