//! Session refresh against the external identity service.
//!
//! Auth cookies are held by the visitor and renewed here: when the access
//! token is missing or close to expiry and a refresh token is present, the
//! identity service is asked for a new pair and `Set-Cookie` headers for it
//! are produced. A failed refresh clears both cookies and lets the request
//! proceed unauthenticated — auth failures are never fatal to page loads.

use axum::http::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::middleware::cookie_value;
use crate::services::auth::token_expiry;
use crate::state::AppState;

/// Cookie holding the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access-token";

/// Cookie holding the refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "refresh-token";

/// Refresh when the access token expires within this many seconds.
const REFRESH_LEEWAY_SECS: i64 = 60;

/// Inspect the request's auth cookies and produce the `Set-Cookie` headers
/// to attach to the response. Empty when nothing needs renewing.
pub async fn refresh_session(state: &AppState, headers: &HeaderMap) -> Vec<HeaderValue> {
    let Some(refresh_token) = cookie_value(headers, REFRESH_TOKEN_COOKIE) else {
        return Vec::new();
    };

    if let Some(access_token) = cookie_value(headers, ACCESS_TOKEN_COOKIE)
        && let Some(exp) = token_expiry(&access_token)
        && exp - chrono::Utc::now().timestamp() > REFRESH_LEEWAY_SECS
    {
        // Still fresh.
        return Vec::new();
    }

    match state.auth().refresh(&refresh_token).await {
        Ok(session) => {
            debug!(expires_in = session.expires_in, "refreshed auth session");
            let mut cookies = Vec::with_capacity(2);
            if let Some(cookie) = build_cookie(
                ACCESS_TOKEN_COOKIE,
                &session.access_token,
                session.expires_in.max(0),
            ) {
                cookies.push(cookie);
            }
            // Refresh tokens are single-use at the identity service; keep the
            // replacement for 30 days.
            if let Some(cookie) = build_cookie(
                REFRESH_TOKEN_COOKIE,
                &session.refresh_token,
                30 * 24 * 3600,
            ) {
                cookies.push(cookie);
            }
            cookies
        }
        Err(e) => {
            warn!(error = %e, "session refresh failed, clearing auth cookies");
            [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE]
                .iter()
                .filter_map(|name| build_cookie(name, "", 0))
                .collect()
        }
    }
}

/// Build a `Set-Cookie` header value.
///
/// `max_age` of 0 clears the cookie. Returns None if the value cannot be a
/// header (control characters), which never happens for tokens the identity
/// service mints.
fn build_cookie(name: &str, value: &str, max_age: i64) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{name}={value}; Path=/; Max-Age={max_age}; HttpOnly; Secure; SameSite=Lax"
    ))
    .ok()
}
