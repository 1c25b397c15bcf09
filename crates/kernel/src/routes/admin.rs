//! Back office API.
//!
//! Everything under /api/admin requires an editor or admin profile; the
//! profile listing is admin-only. Content mutations flush the page cache so
//! public reads pick the change up immediately.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    Article, ContactSubmission, CreateArticle, CreateProduct, CreateTeamMember, Product, Profile,
    SampleRequest, TeamMember, UpdateArticle, UpdateProduct, UpdateTeamMember,
};
use crate::routes::helpers::{page_params, require_admin, require_editor};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AdminListQuery {
    pub category: Option<String>,
    pub status: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}

/// Map an input-validation failure to a 400.
fn invalid(e: anyhow::Error) -> AppError {
    AppError::BadRequest(e.to_string())
}

// =============================================================================
// Products
// =============================================================================

/// List all products including drafts.
///
/// GET /api/admin/products
async fn list_products(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AdminListQuery>,
) -> AppResult<Json<serde_json::Value>> {
    require_editor(&state, &headers).await?;
    let (page, per_page) = page_params(query.page, query.per_page);

    let products =
        Product::list(state.db(), query.category.as_deref(), false, page, per_page).await?;
    let total = Product::count(state.db(), query.category.as_deref(), false).await?;

    Ok(Json(serde_json::json!({
        "products": products,
        "total": total,
        "page": page,
        "perPage": per_page,
    })))
}

/// Create a product.
///
/// POST /api/admin/products
async fn create_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CreateProduct>,
) -> AppResult<Json<Product>> {
    require_editor(&state, &headers).await?;
    input.validate().map_err(invalid)?;

    if Product::find_by_slug(state.db(), input.slug.trim())
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest(format!(
            "a product with slug '{}' already exists",
            input.slug.trim()
        )));
    }

    let product = Product::create(state.db(), input).await?;
    state.page_cache().invalidate_all();

    tracing::info!(id = %product.id, slug = %product.slug, "created product");
    Ok(Json(product))
}

/// Update a product.
///
/// PUT /api/admin/products/{id}
async fn update_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateProduct>,
) -> AppResult<Json<Product>> {
    require_editor(&state, &headers).await?;
    input.validate().map_err(invalid)?;

    let product = Product::update(state.db(), id, input)
        .await?
        .ok_or(AppError::NotFound)?;
    state.page_cache().invalidate_all();

    Ok(Json(product))
}

/// Delete a product.
///
/// DELETE /api/admin/products/{id}
async fn delete_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DeletedResponse>> {
    require_editor(&state, &headers).await?;

    let deleted = Product::delete(state.db(), id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }
    state.page_cache().invalidate_all();

    Ok(Json(DeletedResponse { deleted }))
}

// =============================================================================
// Articles
// =============================================================================

/// List all articles including drafts.
///
/// GET /api/admin/articles
async fn list_articles(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AdminListQuery>,
) -> AppResult<Json<serde_json::Value>> {
    require_editor(&state, &headers).await?;
    let (page, per_page) = page_params(query.page, query.per_page);

    let articles = Article::list(state.db(), false, page, per_page).await?;
    let total = Article::count(state.db(), false).await?;

    Ok(Json(serde_json::json!({
        "articles": articles,
        "total": total,
        "page": page,
        "perPage": per_page,
    })))
}

/// Create an article.
///
/// POST /api/admin/articles
async fn create_article(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CreateArticle>,
) -> AppResult<Json<Article>> {
    require_editor(&state, &headers).await?;
    input.validate().map_err(invalid)?;

    if Article::find_by_slug(state.db(), input.slug.trim())
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest(format!(
            "an article with slug '{}' already exists",
            input.slug.trim()
        )));
    }

    let article = Article::create(state.db(), input).await?;
    state.page_cache().invalidate_all();

    tracing::info!(id = %article.id, slug = %article.slug, "created article");
    Ok(Json(article))
}

/// Update an article.
///
/// PUT /api/admin/articles/{id}
async fn update_article(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateArticle>,
) -> AppResult<Json<Article>> {
    require_editor(&state, &headers).await?;
    input.validate().map_err(invalid)?;

    let article = Article::update(state.db(), id, input)
        .await?
        .ok_or(AppError::NotFound)?;
    state.page_cache().invalidate_all();

    Ok(Json(article))
}

/// Delete an article.
///
/// DELETE /api/admin/articles/{id}
async fn delete_article(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DeletedResponse>> {
    require_editor(&state, &headers).await?;

    let deleted = Article::delete(state.db(), id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }
    state.page_cache().invalidate_all();

    Ok(Json(DeletedResponse { deleted }))
}

// =============================================================================
// Team members
// =============================================================================

/// List team members.
///
/// GET /api/admin/team
async fn list_team(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<serde_json::Value>> {
    require_editor(&state, &headers).await?;

    let members = TeamMember::list_all(state.db()).await?;
    Ok(Json(serde_json::json!({ "team": members })))
}

/// Create a team member.
///
/// POST /api/admin/team
async fn create_team_member(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CreateTeamMember>,
) -> AppResult<Json<TeamMember>> {
    require_editor(&state, &headers).await?;
    input.validate().map_err(invalid)?;

    let member = TeamMember::create(state.db(), input).await?;
    state.page_cache().invalidate_all();

    Ok(Json(member))
}

/// Update a team member.
///
/// PUT /api/admin/team/{id}
async fn update_team_member(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTeamMember>,
) -> AppResult<Json<TeamMember>> {
    require_editor(&state, &headers).await?;
    input.validate().map_err(invalid)?;

    let member = TeamMember::update(state.db(), id, input)
        .await?
        .ok_or(AppError::NotFound)?;
    state.page_cache().invalidate_all();

    Ok(Json(member))
}

/// Delete a team member.
///
/// DELETE /api/admin/team/{id}
async fn delete_team_member(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DeletedResponse>> {
    require_editor(&state, &headers).await?;

    let deleted = TeamMember::delete(state.db(), id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }
    state.page_cache().invalidate_all();

    Ok(Json(DeletedResponse { deleted }))
}

// =============================================================================
// Contact submissions
// =============================================================================

/// List contact submissions, newest first.
///
/// GET /api/admin/contacts
async fn list_contacts(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AdminListQuery>,
) -> AppResult<Json<serde_json::Value>> {
    require_editor(&state, &headers).await?;
    let (page, per_page) = page_params(query.page, query.per_page);

    let submissions = ContactSubmission::list(state.db(), page, per_page).await?;
    let total = ContactSubmission::count(state.db()).await?;

    Ok(Json(serde_json::json!({
        "contacts": submissions,
        "total": total,
        "page": page,
        "perPage": per_page,
    })))
}

/// Delete a contact submission.
///
/// DELETE /api/admin/contacts/{id}
async fn delete_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DeletedResponse>> {
    require_editor(&state, &headers).await?;

    let deleted = ContactSubmission::delete(state.db(), id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }

    Ok(Json(DeletedResponse { deleted }))
}

// =============================================================================
// Sample requests
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct UpdateSampleStatus {
    pub status: String,
}

/// List sample requests, newest first.
///
/// GET /api/admin/samples
async fn list_samples(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AdminListQuery>,
) -> AppResult<Json<serde_json::Value>> {
    require_editor(&state, &headers).await?;
    let (page, per_page) = page_params(query.page, query.per_page);

    let requests = SampleRequest::list(state.db(), query.status.as_deref(), page, per_page).await?;
    let total = SampleRequest::count(state.db(), query.status.as_deref()).await?;

    Ok(Json(serde_json::json!({
        "samples": requests,
        "total": total,
        "page": page,
        "perPage": per_page,
    })))
}

/// Update a sample request status.
///
/// PUT /api/admin/samples/{id}
async fn update_sample(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateSampleStatus>,
) -> AppResult<Json<SampleRequest>> {
    require_editor(&state, &headers).await?;

    crate::models::sample_request::validate_status(&input.status).map_err(invalid)?;

    let request = SampleRequest::set_status(state.db(), id, &input.status)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(request))
}

/// Delete a sample request.
///
/// DELETE /api/admin/samples/{id}
async fn delete_sample(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DeletedResponse>> {
    require_editor(&state, &headers).await?;

    let deleted = SampleRequest::delete(state.db(), id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }

    Ok(Json(DeletedResponse { deleted }))
}

// =============================================================================
// Profiles
// =============================================================================

/// List staff profiles. Admin only.
///
/// GET /api/admin/profiles
async fn list_profiles(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<serde_json::Value>> {
    require_admin(&state, &headers).await?;

    let profiles = Profile::list_all(state.db()).await?;
    Ok(Json(serde_json::json!({ "profiles": profiles })))
}

/// Create the back office router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/products", get(list_products).post(create_product))
        .route(
            "/api/admin/products/{id}",
            put(update_product).delete(delete_product),
        )
        .route("/api/admin/articles", get(list_articles).post(create_article))
        .route(
            "/api/admin/articles/{id}",
            put(update_article).delete(delete_article),
        )
        .route("/api/admin/team", get(list_team).post(create_team_member))
        .route(
            "/api/admin/team/{id}",
            put(update_team_member).delete(delete_team_member),
        )
        .route("/api/admin/contacts", get(list_contacts))
        .route("/api/admin/contacts/{id}", delete(delete_contact))
        .route("/api/admin/samples", get(list_samples))
        .route(
            "/api/admin/samples/{id}",
            put(update_sample).delete(delete_sample),
        )
        .route("/api/admin/profiles", get(list_profiles))
}
