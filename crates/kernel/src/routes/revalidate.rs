//! Cache revalidation endpoint.
//!
//! Evicts a path from the page cache so the next read is rebuilt from the
//! database. Gated by a shared secret when one is configured; the secret is
//! compared in constant time.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::error::{AppError, AppResult, FieldError};
use crate::routes::helpers::{enforce_rate_limit, parse_json_body};
use crate::state::AppState;

/// Header carrying the revalidation secret.
pub const REVALIDATE_SECRET_HEADER: &str = "x-revalidate-secret";

#[derive(Debug, Deserialize)]
pub struct RevalidateRequest {
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RevalidateResponse {
    pub revalidated: bool,
    pub path: String,
    pub timestamp: String,
}

/// Compare the provided secret against the configured one without leaking
/// timing information.
fn secret_matches(configured: &str, provided: &str) -> bool {
    configured.as_bytes().ct_eq(provided.as_bytes()).into()
}

/// Handle a revalidation call.
///
/// POST /api/revalidate
async fn revalidate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<RevalidateResponse>> {
    enforce_rate_limit(
        &state,
        "revalidate",
        state.rate_limits().revalidate,
        &headers,
    )?;

    if let Some(configured) = &state.config().revalidate_secret {
        let provided = headers
            .get(REVALIDATE_SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if !secret_matches(configured, provided) {
            return Err(AppError::Unauthorized);
        }
    }

    let request: RevalidateRequest = parse_json_body(&body)?;

    let path = request.path.unwrap_or_default();
    if path.is_empty() || !path.starts_with('/') {
        return Err(AppError::Validation(vec![FieldError::new(
            "path",
            "Path must start with '/'",
        )]));
    }

    state.page_cache().invalidate(&path).await;

    tracing::info!(path = %path, "revalidated cached path");

    Ok(Json(RevalidateResponse {
        revalidated: true,
        path,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}

/// Create the revalidation router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/revalidate", post(revalidate))
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn secret_comparison() {
        assert!(secret_matches("hunter2", "hunter2"));
        assert!(!secret_matches("hunter2", "hunter3"));
        assert!(!secret_matches("hunter2", ""));
        assert!(!secret_matches("hunter2", "hunter22"));
    }
}
