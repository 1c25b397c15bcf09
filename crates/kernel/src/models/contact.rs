//! Contact submission model.
//!
//! Rows are written by the public contact endpoint and read back in the
//! back office.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A stored contact form submission.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContactSubmission {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub created: DateTime<Utc>,
}

/// Input for storing a contact submission. Validation happens at the API
/// boundary (field-level errors); this type carries checked values only.
#[derive(Debug, Clone)]
pub struct CreateContactSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
}

impl ContactSubmission {
    /// Store a submission.
    pub async fn create(pool: &PgPool, input: CreateContactSubmission) -> Result<Self> {
        let submission = sqlx::query_as::<_, ContactSubmission>(
            r#"
            INSERT INTO contact_submission (
                id, first_name, last_name, email, company, phone, subject, message, created
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(&input.company)
        .bind(&input.phone)
        .bind(&input.subject)
        .bind(&input.message)
        .fetch_one(pool)
        .await
        .context("failed to store contact submission")?;

        Ok(submission)
    }

    /// List submissions, newest first.
    pub async fn list(pool: &PgPool, page: i64, per_page: i64) -> Result<Vec<Self>> {
        let offset = (page - 1) * per_page;

        let submissions = sqlx::query_as::<_, ContactSubmission>(
            "SELECT * FROM contact_submission ORDER BY created DESC LIMIT $1 OFFSET $2",
        )
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("failed to list contact submissions")?;

        Ok(submissions)
    }

    /// Count all submissions.
    pub async fn count(pool: &PgPool) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contact_submission")
            .fetch_one(pool)
            .await
            .context("failed to count contact submissions")?;

        Ok(count)
    }

    /// Delete a submission.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM contact_submission WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete contact submission")?;

        Ok(result.rows_affected() > 0)
    }
}
