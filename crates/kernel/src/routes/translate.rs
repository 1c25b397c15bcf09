//! Translation proxy endpoint.
//!
//! Forwards text to the external machine-translation service so the back
//! office can pre-fill English drafts from French content. Keeps the
//! upstream credential server-side.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, FieldError};
use crate::routes::helpers::{enforce_rate_limit, parse_json_body};
use crate::services::translate::TranslateError;
use crate::state::AppState;

/// Maximum text length forwarded upstream.
const MAX_TEXT_LEN: usize = 10_000;

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: Option<String>,
    pub source: Option<String>,
    pub target: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub translated_text: String,
}

/// Validate the payload, returning one error per offending field.
fn validate(request: &TranslateRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();

    match request.text.as_deref() {
        None | Some("") => errors.push(FieldError::new("text", "This field is required")),
        Some(text) if text.len() > MAX_TEXT_LEN => {
            errors.push(FieldError::new("text", "Text is too long"));
        }
        _ => {}
    }

    for (field, value) in [("source", &request.source), ("target", &request.target)] {
        match value.as_deref().map(str::trim) {
            None | Some("") => errors.push(FieldError::new(field, "This field is required")),
            Some(code) if code.len() > 8 || !code.bytes().all(|b| b.is_ascii_alphabetic()) => {
                errors.push(FieldError::new(field, "Invalid language code"));
            }
            _ => {}
        }
    }

    errors
}

/// Handle a translation call.
///
/// POST /api/translate
async fn translate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<TranslateResponse>> {
    enforce_rate_limit(&state, "translate", state.rate_limits().translate, &headers)?;

    let request: TranslateRequest = parse_json_body(&body)?;

    let errors = validate(&request);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let text = request.text.unwrap_or_default();
    let source = request.source.unwrap_or_default();
    let target = request.target.unwrap_or_default();

    let translated_text = state
        .translate()
        .translate(&text, source.trim(), target.trim())
        .await
        .map_err(|e| match e {
            TranslateError::Unavailable => {
                AppError::Upstream("Translation service unavailable".to_string())
            }
            TranslateError::Other(e) => AppError::Internal(e),
        })?;

    Ok(Json(TranslateResponse { translated_text }))
}

/// Create the translation router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/translate", post(translate))
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn valid_payload_passes() {
        let request = TranslateRequest {
            text: Some("Notre maison cultive la rose centifolia.".to_string()),
            source: Some("fr".to_string()),
            target: Some("en".to_string()),
        };
        assert!(validate(&request).is_empty());
    }

    #[test]
    fn missing_fields_are_reported() {
        let request = TranslateRequest {
            text: None,
            source: None,
            target: None,
        };
        let fields: Vec<String> = validate(&request).into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["text", "source", "target"]);
    }

    #[test]
    fn bad_language_codes_are_rejected() {
        let request = TranslateRequest {
            text: Some("Bonjour".to_string()),
            source: Some("fr-FR!".to_string()),
            target: Some("en".to_string()),
        };
        let errors = validate(&request);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "source");
    }
}
