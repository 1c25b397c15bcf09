//! HTTP middleware components.
//!
//! Two request-time filters run ahead of every route: the session refresher
//! and the locale router. They compose in a fixed order — session refresh
//! first, so locale decisions always see the renewed session state — and
//! produce exactly one outbound response carrying both the refreshed
//! cookies and the locale redirect/rewrite.

pub mod language;
pub mod rate_limit;
pub mod session_refresh;

pub use rate_limit::{
    RateLimitConfig, RateLimitDecision, RateLimitPolicy, RateLimiter, SweeperHandle, client_key,
};

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};

use crate::state::AppState;

/// Composed request pipeline: session refresh, then locale routing.
///
/// When the locale router answers with its own response (a redirect), the
/// session step's `Set-Cookie` headers are appended to it — complete header
/// values, attributes included — so a redirected first request still lands
/// with renewed auth cookies. Pass-through responses get the same headers.
pub async fn request_pipeline(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let session_cookies = session_refresh::refresh_session(&state, request.headers()).await;

    let mut response = match language::route(&state, request) {
        language::RouteAction::Redirect(response) => response,
        language::RouteAction::Forward(request) => next.run(request).await,
    };

    for cookie in session_cookies {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }

    response
}

/// Read a cookie value from the `Cookie` request header.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;

    for pair in raw.split(';') {
        let pair = pair.trim();
        if let Some((key, value)) = pair.split_once('=')
            && key == name
        {
            return Some(value.to_string());
        }
    }

    None
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, value.parse().unwrap());
        headers
    }

    #[test]
    fn cookie_value_finds_named_cookie() {
        let headers = headers_with_cookie("a=1; access-token=abc.def.ghi; b=2");
        assert_eq!(
            cookie_value(&headers, "access-token").as_deref(),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn cookie_value_missing_returns_none() {
        let headers = headers_with_cookie("a=1");
        assert_eq!(cookie_value(&headers, "refresh-token"), None);
    }

    #[test]
    fn cookie_value_does_not_match_prefix_names() {
        let headers = headers_with_cookie("access-token-old=zzz");
        assert_eq!(cookie_value(&headers, "access-token"), None);
    }

    #[test]
    fn cookie_value_without_header() {
        assert_eq!(cookie_value(&HeaderMap::new(), "access-token"), None);
    }
}
