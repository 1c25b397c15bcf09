//! Blog article model and CRUD operations.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Blog article record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Article {
    pub id: Uuid,
    pub slug: String,
    pub title_fr: String,
    pub title_en: Option<String>,
    pub body_fr: String,
    pub body_en: Option<String>,
    pub excerpt_fr: Option<String>,
    pub excerpt_en: Option<String>,
    pub cover_image_url: Option<String>,
    pub published: bool,
    /// Set when the article is first published.
    pub published_at: Option<DateTime<Utc>>,
    pub created: DateTime<Utc>,
    pub changed: DateTime<Utc>,
}

/// Input for creating an article.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateArticle {
    pub slug: String,
    pub title_fr: String,
    pub title_en: Option<String>,
    pub body_fr: String,
    pub body_en: Option<String>,
    pub excerpt_fr: Option<String>,
    pub excerpt_en: Option<String>,
    pub cover_image_url: Option<String>,
    pub published: Option<bool>,
}

/// Input for updating an article. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateArticle {
    pub title_fr: Option<String>,
    pub title_en: Option<String>,
    pub body_fr: Option<String>,
    pub body_en: Option<String>,
    pub excerpt_fr: Option<String>,
    pub excerpt_en: Option<String>,
    pub cover_image_url: Option<String>,
    pub published: Option<bool>,
}

impl CreateArticle {
    pub fn validate(&self) -> Result<()> {
        if !crate::models::is_valid_slug(&self.slug) {
            anyhow::bail!("slug must be lowercase letters, digits and hyphens");
        }
        if self.title_fr.trim().is_empty() {
            anyhow::bail!("title_fr must not be empty");
        }
        if self.body_fr.trim().is_empty() {
            anyhow::bail!("body_fr must not be empty");
        }
        Ok(())
    }
}

impl UpdateArticle {
    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title_fr
            && title.trim().is_empty()
        {
            anyhow::bail!("title_fr must not be empty");
        }
        if let Some(body) = &self.body_fr
            && body.trim().is_empty()
        {
            anyhow::bail!("body_fr must not be empty");
        }
        Ok(())
    }
}

impl Article {
    /// Find an article by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let article = sqlx::query_as::<_, Article>("SELECT * FROM article WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .context("failed to fetch article by id")?;

        Ok(article)
    }

    /// Find an article by slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Self>> {
        let article = sqlx::query_as::<_, Article>("SELECT * FROM article WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await
            .context("failed to fetch article by slug")?;

        Ok(article)
    }

    /// List articles, newest first.
    ///
    /// `published_only` restricts to published articles ordered by publish
    /// date (the public blog); the back office lists drafts too, by change
    /// date.
    pub async fn list(
        pool: &PgPool,
        published_only: bool,
        page: i64,
        per_page: i64,
    ) -> Result<Vec<Self>> {
        let offset = (page - 1) * per_page;

        let articles = sqlx::query_as::<_, Article>(
            r#"
            SELECT * FROM article
            WHERE (NOT $1 OR published)
            ORDER BY COALESCE(published_at, changed) DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(published_only)
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("failed to list articles")?;

        Ok(articles)
    }

    /// Count articles matching the same filter as [`Self::list`].
    pub async fn count(pool: &PgPool, published_only: bool) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM article WHERE (NOT $1 OR published)")
                .bind(published_only)
                .fetch_one(pool)
                .await
                .context("failed to count articles")?;

        Ok(count)
    }

    /// Create an article. `published_at` is stamped when created published.
    pub async fn create(pool: &PgPool, input: CreateArticle) -> Result<Self> {
        let published = input.published.unwrap_or(false);

        let article = sqlx::query_as::<_, Article>(
            r#"
            INSERT INTO article (
                id, slug, title_fr, title_en, body_fr, body_en, excerpt_fr, excerpt_en,
                cover_image_url, published, published_at, created, changed
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    CASE WHEN $10 THEN NOW() END, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.slug.trim())
        .bind(input.title_fr.trim())
        .bind(&input.title_en)
        .bind(&input.body_fr)
        .bind(&input.body_en)
        .bind(&input.excerpt_fr)
        .bind(&input.excerpt_en)
        .bind(&input.cover_image_url)
        .bind(published)
        .fetch_one(pool)
        .await
        .context("failed to create article")?;

        Ok(article)
    }

    /// Update an article. First publication stamps `published_at`.
    pub async fn update(pool: &PgPool, id: Uuid, input: UpdateArticle) -> Result<Option<Self>> {
        let article = sqlx::query_as::<_, Article>(
            r#"
            UPDATE article SET
                title_fr = COALESCE($2, title_fr),
                title_en = COALESCE($3, title_en),
                body_fr = COALESCE($4, body_fr),
                body_en = COALESCE($5, body_en),
                excerpt_fr = COALESCE($6, excerpt_fr),
                excerpt_en = COALESCE($7, excerpt_en),
                cover_image_url = COALESCE($8, cover_image_url),
                published = COALESCE($9, published),
                published_at = CASE
                    WHEN COALESCE($9, published) AND published_at IS NULL THEN NOW()
                    ELSE published_at
                END,
                changed = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.title_fr)
        .bind(&input.title_en)
        .bind(&input.body_fr)
        .bind(&input.body_en)
        .bind(&input.excerpt_fr)
        .bind(&input.excerpt_en)
        .bind(&input.cover_image_url)
        .bind(input.published)
        .fetch_optional(pool)
        .await
        .context("failed to update article")?;

        Ok(article)
    }

    /// Delete an article.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM article WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete article")?;

        Ok(result.rows_affected() > 0)
    }

    /// Localized title for a request language.
    pub fn title(&self, language: &str) -> &str {
        crate::models::localized(&self.title_fr, self.title_en.as_deref(), language)
    }

    /// Localized body for a request language.
    pub fn body(&self, language: &str) -> &str {
        crate::models::localized(&self.body_fr, self.body_en.as_deref(), language)
    }

    /// Localized excerpt for a request language, if any.
    pub fn excerpt(&self, language: &str) -> Option<&str> {
        match (language, &self.excerpt_en, &self.excerpt_fr) {
            ("en", Some(en), _) if !en.is_empty() => Some(en),
            (_, _, Some(fr)) => Some(fr),
            _ => None,
        }
    }
}
