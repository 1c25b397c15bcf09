//! Sample request model.
//!
//! B2B visitors request product samples; staff process them in the back
//! office by flipping the status.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Valid sample request statuses.
pub const VALID_STATUSES: &[&str] = &["pending", "processed"];

/// A stored sample request.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SampleRequest {
    pub id: Uuid,
    pub product_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    /// One of [`VALID_STATUSES`].
    pub status: String,
    pub created: DateTime<Utc>,
    pub changed: DateTime<Utc>,
}

/// Input for storing a sample request. Carries boundary-checked values.
#[derive(Debug, Clone)]
pub struct CreateSampleRequest {
    pub product_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
}

/// Validate a sample request status value.
pub fn validate_status(status: &str) -> Result<()> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        anyhow::bail!(
            "invalid status '{status}': must be one of {}",
            VALID_STATUSES.join(", ")
        )
    }
}

impl SampleRequest {
    /// Store a request with status "pending".
    pub async fn create(pool: &PgPool, input: CreateSampleRequest) -> Result<Self> {
        let request = sqlx::query_as::<_, SampleRequest>(
            r#"
            INSERT INTO sample_request (
                id, product_id, first_name, last_name, email, company, phone, message,
                status, created, changed
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending', NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.product_id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(&input.company)
        .bind(&input.phone)
        .bind(&input.message)
        .fetch_one(pool)
        .await
        .context("failed to store sample request")?;

        Ok(request)
    }

    /// List requests, newest first, optionally filtered by status.
    pub async fn list(
        pool: &PgPool,
        status: Option<&str>,
        page: i64,
        per_page: i64,
    ) -> Result<Vec<Self>> {
        let offset = (page - 1) * per_page;

        let requests = sqlx::query_as::<_, SampleRequest>(
            r#"
            SELECT * FROM sample_request
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(status)
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("failed to list sample requests")?;

        Ok(requests)
    }

    /// Count requests matching the same filter as [`Self::list`].
    pub async fn count(pool: &PgPool, status: Option<&str>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sample_request WHERE ($1::text IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(pool)
        .await
        .context("failed to count sample requests")?;

        Ok(count)
    }

    /// Update the status of a request. Returns None if it does not exist.
    pub async fn set_status(pool: &PgPool, id: Uuid, status: &str) -> Result<Option<Self>> {
        validate_status(status)?;

        let request = sqlx::query_as::<_, SampleRequest>(
            "UPDATE sample_request SET status = $2, changed = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await
        .context("failed to update sample request status")?;

        Ok(request)
    }

    /// Delete a request.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sample_request WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete sample request")?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn status_validation() {
        assert!(validate_status("pending").is_ok());
        assert!(validate_status("processed").is_ok());
        assert!(validate_status("shipped").is_err());
        assert!(validate_status("").is_err());
    }
}
