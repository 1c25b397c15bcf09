//! Public sample request endpoint.
//!
//! B2B visitors request a sample of a catalog product. Same envelope and
//! rate limit as the contact form, plus a product reference that must point
//! at a published, sample-enabled product.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult, FieldError};
use crate::models::{CreateSampleRequest, Product, SampleRequest, is_valid_email};
use crate::routes::helpers::{enforce_rate_limit, parse_json_body};
use crate::state::AppState;

/// Sample request payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleRequestPayload {
    pub product_slug: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SampleResponse {
    pub success: bool,
    pub id: Uuid,
}

/// Validate everything except the product reference, which needs the
/// database.
fn validate(payload: &SampleRequestPayload) -> Vec<FieldError> {
    let mut errors = Vec::new();

    let mut require = |field: &str, value: &Option<String>| {
        if value.as_deref().map(str::trim).unwrap_or_default().is_empty() {
            errors.push(FieldError::new(field, "This field is required"));
        }
    };

    require("productSlug", &payload.product_slug);
    require("firstName", &payload.first_name);
    require("lastName", &payload.last_name);

    match payload.email.as_deref().map(str::trim) {
        None | Some("") => errors.push(FieldError::new("email", "This field is required")),
        Some(email) if !is_valid_email(email) => {
            errors.push(FieldError::new("email", "Invalid email address"));
        }
        _ => {}
    }

    errors
}

/// Handle a sample request.
///
/// POST /api/samples
async fn submit_sample_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<SampleResponse>> {
    enforce_rate_limit(&state, "samples", state.rate_limits().samples, &headers)?;

    let payload: SampleRequestPayload = parse_json_body(&body)?;

    let errors = validate(&payload);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let slug = payload.product_slug.unwrap_or_default();
    let product = Product::find_by_slug(state.db(), slug.trim()).await?;

    let Some(product) = product.filter(|p| p.published && p.sample_available) else {
        return Err(AppError::Validation(vec![FieldError::new(
            "productSlug",
            "No sample is available for this product",
        )]));
    };

    let input = CreateSampleRequest {
        product_id: product.id,
        first_name: payload.first_name.unwrap_or_default().trim().to_string(),
        last_name: payload.last_name.unwrap_or_default().trim().to_string(),
        email: payload.email.unwrap_or_default().trim().to_string(),
        company: payload.company.filter(|s| !s.trim().is_empty()),
        phone: payload.phone.filter(|s| !s.trim().is_empty()),
        message: payload.message.filter(|s| !s.trim().is_empty()),
    };

    let request = SampleRequest::create(state.db(), input).await?;

    if let Some(email) = state.email()
        && let Some(recipient) = &state.config().contact_recipient
        && let Err(e) = email
            .send_sample_notification(recipient, &request, &product.name_fr)
            .await
    {
        tracing::warn!(error = %e, "failed to send sample notification");
    }

    tracing::info!(id = %request.id, product = %product.slug, "stored sample request");

    Ok(Json(SampleResponse {
        success: true,
        id: request.id,
    }))
}

/// Create the sample request router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/samples", post(submit_sample_request))
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_product_slug_is_reported() {
        let payload = SampleRequestPayload {
            product_slug: None,
            first_name: Some("Claire".to_string()),
            last_name: Some("Moreau".to_string()),
            email: Some("claire@maison.fr".to_string()),
            company: None,
            phone: None,
            message: None,
        };

        let errors = validate(&payload);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "productSlug");
    }

    #[test]
    fn email_format_is_checked() {
        let payload = SampleRequestPayload {
            product_slug: Some("absolue-jasmin".to_string()),
            first_name: Some("Claire".to_string()),
            last_name: Some("Moreau".to_string()),
            email: Some("nope".to_string()),
            company: None,
            phone: None,
            message: None,
        };

        let errors = validate(&payload);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "email");
    }
}
