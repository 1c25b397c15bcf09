//! Shared route helpers: authorization, rate limiting, body parsing.

use axum::http::HeaderMap;
use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult};
use crate::middleware::rate_limit::{RateLimitPolicy, client_key};
use crate::middleware::{cookie_value, session_refresh::ACCESS_TOKEN_COOKIE};
use crate::models::Profile;
use crate::state::AppState;

/// Default page size for list endpoints.
const DEFAULT_PER_PAGE: i64 = 20;

/// Maximum page size for list endpoints.
const MAX_PER_PAGE: i64 = 100;

/// Extract the caller's access token from the Authorization header or the
/// session cookie.
fn access_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get("authorization")
        && let Ok(value) = value.to_str()
        && let Some(token) = value.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    cookie_value(headers, ACCESS_TOKEN_COOKIE)
}

/// Resolve the caller to a profile, or fail with 401.
async fn authenticate(state: &AppState, headers: &HeaderMap) -> AppResult<Profile> {
    let token = access_token(headers).ok_or(AppError::Unauthorized)?;

    let claims = state
        .auth()
        .verify_access_token(&token)
        .map_err(|_| AppError::Unauthorized)?;

    let profile = Profile::find_by_id(state.db(), claims.sub).await?;

    // A verified token without a profile row means the account was never
    // provisioned for the back office.
    profile.ok_or(AppError::Forbidden)
}

/// Require an authenticated profile with at least editor access.
///
/// 401 when the token is missing or invalid, 403 when the profile exists
/// but lacks the role.
pub async fn require_editor(state: &AppState, headers: &HeaderMap) -> AppResult<Profile> {
    let profile = authenticate(state, headers).await?;
    if profile.can_edit() {
        Ok(profile)
    } else {
        Err(AppError::Forbidden)
    }
}

/// Require an authenticated **admin** profile.
pub async fn require_admin(state: &AppState, headers: &HeaderMap) -> AppResult<Profile> {
    let profile = authenticate(state, headers).await?;
    if profile.is_admin() {
        Ok(profile)
    } else {
        Err(AppError::Forbidden)
    }
}

/// Apply a rate limit policy keyed by endpoint category and client IP.
///
/// The limiter itself never errors; a rejected call surfaces as
/// [`AppError::RateLimited`] which renders a 429 with `Retry-After`.
pub fn enforce_rate_limit(
    state: &AppState,
    category: &str,
    policy: RateLimitPolicy,
    headers: &HeaderMap,
) -> AppResult<()> {
    let key = format!("{category}:{}", client_key(headers));
    let decision = state.rate_limiter().check(&key, policy);

    if decision.allowed {
        Ok(())
    } else {
        Err(AppError::RateLimited {
            retry_after: policy.retry_after_secs(),
        })
    }
}

/// Parse a JSON request body collected as bytes.
///
/// Malformed JSON is a 400, not an unhandled fault. Missing fields are left
/// to per-endpoint validation so they surface as field errors.
pub fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> AppResult<T> {
    serde_json::from_slice(body).map_err(|_| AppError::BadRequest("Invalid JSON body".to_string()))
}

/// Resolve the `lang` query parameter against the known site languages.
pub fn resolve_language(state: &AppState, lang: Option<&str>) -> AppResult<String> {
    match lang {
        None => Ok(state.default_language().to_string()),
        Some(lang) if state.known_languages().iter().any(|l| l == lang) => Ok(lang.to_string()),
        Some(lang) => Err(AppError::BadRequest(format!(
            "unsupported language '{lang}'"
        ))),
    }
}

/// Clamp pagination parameters to sane bounds.
pub fn page_params(page: Option<i64>, per_page: Option<i64>) -> (i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
    (page, per_page)
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn access_token_prefers_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer abc.def.ghi".parse().unwrap());
        headers.insert("cookie", "access-token=cookie-token".parse().unwrap());
        assert_eq!(access_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn access_token_falls_back_to_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", "access-token=cookie-token".parse().unwrap());
        assert_eq!(access_token(&headers).as_deref(), Some("cookie-token"));
    }

    #[test]
    fn access_token_none_without_credentials() {
        assert_eq!(access_token(&HeaderMap::new()), None);
    }

    #[test]
    fn page_params_clamp() {
        assert_eq!(page_params(None, None), (1, 20));
        assert_eq!(page_params(Some(0), Some(0)), (1, 1));
        assert_eq!(page_params(Some(-3), Some(1000)), (1, 100));
        assert_eq!(page_params(Some(4), Some(50)), (4, 50));
    }

    #[test]
    fn parse_json_body_rejects_garbage() {
        let result: AppResult<serde_json::Value> = parse_json_body(b"{not json");
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
