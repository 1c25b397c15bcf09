//! Product model and CRUD operations.
//!
//! Products cover the three catalog categories (perfumes, cosmetics,
//! aromas). French text is the base; English columns are optional overlays.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Valid product categories.
pub const VALID_CATEGORIES: &[&str] = &["perfume", "cosmetic", "aroma"];

/// Product record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    /// URL-safe unique identifier (e.g. "absolue-jasmin").
    pub slug: String,
    /// One of [`VALID_CATEGORIES`].
    pub category: String,
    pub name_fr: String,
    pub name_en: Option<String>,
    pub description_fr: String,
    pub description_en: Option<String>,
    /// Olfactory family label (e.g. "florale", "boisée"). Perfumes/aromas only.
    pub olfactory_family: Option<String>,
    pub image_url: Option<String>,
    /// Whether visitors may request a sample of this product.
    pub sample_available: bool,
    pub published: bool,
    pub created: DateTime<Utc>,
    pub changed: DateTime<Utc>,
}

/// Input for creating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduct {
    pub slug: String,
    pub category: String,
    pub name_fr: String,
    pub name_en: Option<String>,
    pub description_fr: String,
    pub description_en: Option<String>,
    pub olfactory_family: Option<String>,
    pub image_url: Option<String>,
    pub sample_available: Option<bool>,
    pub published: Option<bool>,
}

/// Input for updating a product. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProduct {
    pub category: Option<String>,
    pub name_fr: Option<String>,
    pub name_en: Option<String>,
    pub description_fr: Option<String>,
    pub description_en: Option<String>,
    pub olfactory_family: Option<String>,
    pub image_url: Option<String>,
    pub sample_available: Option<bool>,
    pub published: Option<bool>,
}

/// Validate that a category is one of the known catalog categories.
pub fn validate_category(category: &str) -> Result<()> {
    if VALID_CATEGORIES.contains(&category) {
        Ok(())
    } else {
        anyhow::bail!(
            "invalid category '{category}': must be one of {}",
            VALID_CATEGORIES.join(", ")
        )
    }
}

impl CreateProduct {
    /// Validate the input before touching the database.
    pub fn validate(&self) -> Result<()> {
        if !crate::models::is_valid_slug(&self.slug) {
            anyhow::bail!("slug must be lowercase letters, digits and hyphens");
        }
        validate_category(&self.category)?;
        if self.name_fr.trim().is_empty() {
            anyhow::bail!("name_fr must not be empty");
        }
        if self.description_fr.trim().is_empty() {
            anyhow::bail!("description_fr must not be empty");
        }
        Ok(())
    }
}

impl UpdateProduct {
    pub fn validate(&self) -> Result<()> {
        if let Some(category) = &self.category {
            validate_category(category)?;
        }
        if let Some(name) = &self.name_fr
            && name.trim().is_empty()
        {
            anyhow::bail!("name_fr must not be empty");
        }
        if let Some(description) = &self.description_fr
            && description.trim().is_empty()
        {
            anyhow::bail!("description_fr must not be empty");
        }
        Ok(())
    }
}

impl Product {
    /// Find a product by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM product WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .context("failed to fetch product by id")?;

        Ok(product)
    }

    /// Find a product by slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Self>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM product WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await
            .context("failed to fetch product by slug")?;

        Ok(product)
    }

    /// List products, optionally filtered by category.
    ///
    /// `published_only` hides drafts (the public catalog view); the back
    /// office lists everything.
    pub async fn list(
        pool: &PgPool,
        category: Option<&str>,
        published_only: bool,
        page: i64,
        per_page: i64,
    ) -> Result<Vec<Self>> {
        let offset = (page - 1) * per_page;

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM product
            WHERE ($1::text IS NULL OR category = $1)
              AND (NOT $2 OR published)
            ORDER BY created DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(category)
        .bind(published_only)
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("failed to list products")?;

        Ok(products)
    }

    /// Count products matching the same filter as [`Self::list`].
    pub async fn count(pool: &PgPool, category: Option<&str>, published_only: bool) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM product
            WHERE ($1::text IS NULL OR category = $1)
              AND (NOT $2 OR published)
            "#,
        )
        .bind(category)
        .bind(published_only)
        .fetch_one(pool)
        .await
        .context("failed to count products")?;

        Ok(count)
    }

    /// Create a product.
    pub async fn create(pool: &PgPool, input: CreateProduct) -> Result<Self> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO product (
                id, slug, category, name_fr, name_en, description_fr, description_en,
                olfactory_family, image_url, sample_available, published, created, changed
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.slug.trim())
        .bind(&input.category)
        .bind(input.name_fr.trim())
        .bind(&input.name_en)
        .bind(input.description_fr.trim())
        .bind(&input.description_en)
        .bind(&input.olfactory_family)
        .bind(&input.image_url)
        .bind(input.sample_available.unwrap_or(false))
        .bind(input.published.unwrap_or(false))
        .fetch_one(pool)
        .await
        .context("failed to create product")?;

        Ok(product)
    }

    /// Update a product. Returns None if it does not exist.
    pub async fn update(pool: &PgPool, id: Uuid, input: UpdateProduct) -> Result<Option<Self>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE product SET
                category = COALESCE($2, category),
                name_fr = COALESCE($3, name_fr),
                name_en = COALESCE($4, name_en),
                description_fr = COALESCE($5, description_fr),
                description_en = COALESCE($6, description_en),
                olfactory_family = COALESCE($7, olfactory_family),
                image_url = COALESCE($8, image_url),
                sample_available = COALESCE($9, sample_available),
                published = COALESCE($10, published),
                changed = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.category)
        .bind(&input.name_fr)
        .bind(&input.name_en)
        .bind(&input.description_fr)
        .bind(&input.description_en)
        .bind(&input.olfactory_family)
        .bind(&input.image_url)
        .bind(input.sample_available)
        .bind(input.published)
        .fetch_optional(pool)
        .await
        .context("failed to update product")?;

        Ok(product)
    }

    /// Delete a product.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete product")?;

        Ok(result.rows_affected() > 0)
    }

    /// Localized name for a request language.
    pub fn name(&self, language: &str) -> &str {
        crate::models::localized(&self.name_fr, self.name_en.as_deref(), language)
    }

    /// Localized description for a request language.
    pub fn description(&self, language: &str) -> &str {
        crate::models::localized(
            &self.description_fr,
            self.description_en.as_deref(),
            language,
        )
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn create_input() -> CreateProduct {
        CreateProduct {
            slug: "absolue-jasmin".to_string(),
            category: "perfume".to_string(),
            name_fr: "Absolue de jasmin".to_string(),
            name_en: Some("Jasmine absolute".to_string()),
            description_fr: "Un absolu floral intense.".to_string(),
            description_en: None,
            olfactory_family: Some("florale".to_string()),
            image_url: None,
            sample_available: Some(true),
            published: Some(true),
        }
    }

    #[test]
    fn validate_accepts_well_formed_input() {
        assert!(create_input().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_slug() {
        let mut input = create_input();
        input.slug = "Absolue Jasmin".to_string();
        assert!(input.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_category() {
        let mut input = create_input();
        input.category = "candle".to_string();
        assert!(input.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_french_name() {
        let mut input = create_input();
        input.name_fr = "   ".to_string();
        assert!(input.validate().is_err());
    }

    #[test]
    fn update_validate_checks_provided_fields_only() {
        assert!(UpdateProduct::default().validate().is_ok());

        let bad_category = UpdateProduct {
            category: Some("candle".to_string()),
            ..Default::default()
        };
        assert!(bad_category.validate().is_err());
    }

    #[test]
    fn localized_accessors_fall_back() {
        let product = Product {
            id: Uuid::new_v4(),
            slug: "absolue-jasmin".to_string(),
            category: "perfume".to_string(),
            name_fr: "Absolue de jasmin".to_string(),
            name_en: Some("Jasmine absolute".to_string()),
            description_fr: "Un absolu floral intense.".to_string(),
            description_en: None,
            olfactory_family: None,
            image_url: None,
            sample_available: true,
            published: true,
            created: Utc::now(),
            changed: Utc::now(),
        };

        assert_eq!(product.name("en"), "Jasmine absolute");
        assert_eq!(product.name("fr"), "Absolue de jasmin");
        // Missing English description falls back to French.
        assert_eq!(product.description("en"), "Un absolu floral intense.");
    }
}
