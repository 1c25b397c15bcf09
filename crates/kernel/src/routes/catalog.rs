//! Public catalog endpoints: products, blog articles, team.
//!
//! Read-only, localized via the `lang` query parameter, and served through
//! the page cache. Only published content is visible here; drafts belong to
//! the back office.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Article, Product, TeamMember, product};
use crate::routes::helpers::{page_params, resolve_language};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub lang: Option<String>,
    pub category: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    pub lang: Option<String>,
}

/// Localized product projection.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductView {
    id: Uuid,
    slug: String,
    category: String,
    name: String,
    description: String,
    olfactory_family: Option<String>,
    image_url: Option<String>,
    sample_available: bool,
}

impl ProductView {
    fn new(product: &Product, language: &str) -> Self {
        Self {
            id: product.id,
            slug: product.slug.clone(),
            category: product.category.clone(),
            name: product.name(language).to_string(),
            description: product.description(language).to_string(),
            olfactory_family: product.olfactory_family.clone(),
            image_url: product.image_url.clone(),
            sample_available: product.sample_available,
        }
    }
}

/// Localized article projection.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ArticleView {
    id: Uuid,
    slug: String,
    title: String,
    body: String,
    excerpt: Option<String>,
    cover_image_url: Option<String>,
    published_at: Option<String>,
}

impl ArticleView {
    fn new(article: &Article, language: &str) -> Self {
        Self {
            id: article.id,
            slug: article.slug.clone(),
            title: article.title(language).to_string(),
            body: article.body(language).to_string(),
            excerpt: article.excerpt(language).map(str::to_string),
            cover_image_url: article.cover_image_url.clone(),
            published_at: article.published_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Localized team member projection.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TeamMemberView {
    id: Uuid,
    name: String,
    role: String,
    bio: Option<String>,
    photo_url: Option<String>,
}

impl TeamMemberView {
    fn new(member: &TeamMember, language: &str) -> Self {
        let bio = match (language, &member.bio_en, &member.bio_fr) {
            ("en", Some(en), _) if !en.is_empty() => Some(en.clone()),
            (_, _, fr) => fr.clone(),
        };

        Self {
            id: member.id,
            name: member.name.clone(),
            role: member.role(language).to_string(),
            bio,
            photo_url: member.photo_url.clone(),
        }
    }
}

/// List published products.
///
/// GET /api/products
async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let language = resolve_language(&state, query.lang.as_deref())?;
    let (page, per_page) = page_params(query.page, query.per_page);

    if let Some(category) = query.category.as_deref() {
        product::validate_category(category)
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
    }

    let cache_key = format!(
        "/api/products?lang={language}&category={}&page={page}&per_page={per_page}",
        query.category.as_deref().unwrap_or("")
    );
    if let Some(cached) = state.page_cache().get(&cache_key).await {
        return Ok(Json(cached));
    }

    let products =
        Product::list(state.db(), query.category.as_deref(), true, page, per_page).await?;
    let total = Product::count(state.db(), query.category.as_deref(), true).await?;

    let views: Vec<ProductView> = products
        .iter()
        .map(|p| ProductView::new(p, &language))
        .collect();

    let payload = serde_json::json!({
        "products": views,
        "total": total,
        "page": page,
        "perPage": per_page,
    });

    state.page_cache().insert(cache_key, payload.clone()).await;

    Ok(Json(payload))
}

/// Fetch one published product by slug.
///
/// GET /api/products/{slug}
async fn get_product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<DetailQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let language = resolve_language(&state, query.lang.as_deref())?;

    let cache_key = format!("/api/products/{slug}?lang={language}");
    if let Some(cached) = state.page_cache().get(&cache_key).await {
        return Ok(Json(cached));
    }

    let product = Product::find_by_slug(state.db(), &slug)
        .await?
        .filter(|p| p.published)
        .ok_or(AppError::NotFound)?;

    let payload = serde_json::json!({ "product": ProductView::new(&product, &language) });

    state.page_cache().insert(cache_key, payload.clone()).await;

    Ok(Json(payload))
}

/// List published blog articles.
///
/// GET /api/articles
async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let language = resolve_language(&state, query.lang.as_deref())?;
    let (page, per_page) = page_params(query.page, query.per_page);

    let cache_key = format!("/api/articles?lang={language}&page={page}&per_page={per_page}");
    if let Some(cached) = state.page_cache().get(&cache_key).await {
        return Ok(Json(cached));
    }

    let articles = Article::list(state.db(), true, page, per_page).await?;
    let total = Article::count(state.db(), true).await?;

    let views: Vec<ArticleView> = articles
        .iter()
        .map(|a| ArticleView::new(a, &language))
        .collect();

    let payload = serde_json::json!({
        "articles": views,
        "total": total,
        "page": page,
        "perPage": per_page,
    });

    state.page_cache().insert(cache_key, payload.clone()).await;

    Ok(Json(payload))
}

/// Fetch one published article by slug.
///
/// GET /api/articles/{slug}
async fn get_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<DetailQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let language = resolve_language(&state, query.lang.as_deref())?;

    let cache_key = format!("/api/articles/{slug}?lang={language}");
    if let Some(cached) = state.page_cache().get(&cache_key).await {
        return Ok(Json(cached));
    }

    let article = Article::find_by_slug(state.db(), &slug)
        .await?
        .filter(|a| a.published)
        .ok_or(AppError::NotFound)?;

    let payload = serde_json::json!({ "article": ArticleView::new(&article, &language) });

    state.page_cache().insert(cache_key, payload.clone()).await;

    Ok(Json(payload))
}

/// List team members.
///
/// GET /api/team
async fn list_team(
    State(state): State<AppState>,
    Query(query): Query<DetailQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let language = resolve_language(&state, query.lang.as_deref())?;

    let cache_key = format!("/api/team?lang={language}");
    if let Some(cached) = state.page_cache().get(&cache_key).await {
        return Ok(Json(cached));
    }

    let members = TeamMember::list_all(state.db()).await?;
    let views: Vec<TeamMemberView> = members
        .iter()
        .map(|m| TeamMemberView::new(m, &language))
        .collect();

    let payload = serde_json::json!({ "team": views });

    state.page_cache().insert(cache_key, payload.clone()).await;

    Ok(Json(payload))
}

/// Create the public catalog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/{slug}", get(get_product))
        .route("/api/articles", get(list_articles))
        .route("/api/articles/{slug}", get(get_article))
        .route("/api/team", get(list_team))
}
