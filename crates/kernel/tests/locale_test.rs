//! Integration tests for locale routing and the middleware composition.

// Tests are allowed to use unwrap/expect freely.
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use common::test_app;

fn get(uri: &str) -> axum::http::request::Builder {
    Request::builder().method("GET").uri(uri)
}

#[tokio::test]
async fn unprefixed_path_redirects_to_negotiated_language() {
    let app = test_app(None);

    let response = app
        .oneshot(
            get("/notre-maison")
                .header("accept-language", "en-US,en;q=0.9")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/en/notre-maison"
    );
}

#[tokio::test]
async fn redirect_preserves_query_string() {
    let app = test_app(None);

    let response = app
        .oneshot(
            get("/produits?categorie=parfum")
                .header("accept-language", "en")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/en/produits?categorie=parfum"
    );
}

#[tokio::test]
async fn default_language_passes_through_without_redirect() {
    let app = test_app(None);

    let response = app
        .oneshot(
            get("/notre-maison")
                .header("accept-language", "fr-FR,fr;q=0.9")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // No redirect; the path simply has no route behind it in this backend.
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn english_prefix_is_rewritten_not_redirected() {
    let app = test_app(None);

    let response = app
        .oneshot(get("/en/notre-maison").body(Body::empty()).unwrap())
        .await
        .unwrap();

    // The prefix is stripped and the request forwarded: no redirect.
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn default_prefix_redirects_to_canonical_path() {
    let app = test_app(None);

    let response = app
        .oneshot(get("/fr/contact").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/contact");
}

#[tokio::test]
async fn language_cookie_beats_accept_language() {
    let app = test_app(None);

    let response = app
        .oneshot(
            get("/notre-maison")
                .header("cookie", "preferred_language=fr")
                .header("accept-language", "en")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Cookie says the default language: no redirect.
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_prefix_is_not_treated_as_language() {
    let app = test_app(None);

    let response = app
        .oneshot(get("/enfleurage").body(Body::empty()).unwrap())
        .await
        .unwrap();

    // "/enfleurage" must not match the "en" prefix.
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_paths_bypass_locale_routing() {
    let app = test_app(None);

    let response = app
        .oneshot(
            get("/api/health")
                .header("accept-language", "en")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Health answers directly (503 without a database) instead of being
    // redirected to a language prefix.
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn locale_redirect_carries_session_cookies() {
    let app = test_app(None);

    // A refresh token is present but the identity service is unreachable:
    // the session step clears the auth cookies, and the locale step answers
    // with a redirect. The merged response must carry both.
    let response = app
        .oneshot(
            get("/notre-maison")
                .header("accept-language", "en")
                .header("cookie", "refresh-token=stale-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/en/notre-maison"
    );

    let cookies: Vec<&str> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap())
        .collect();

    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().any(|c| c.starts_with("access-token=")));
    assert!(cookies.iter().any(|c| c.starts_with("refresh-token=")));
    // Attributes are carried intact, not just name/value pairs.
    for cookie in cookies {
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Path=/"));
    }
}

#[tokio::test]
async fn pass_through_response_also_gets_session_cookies() {
    let app = test_app(None);

    let response = app
        .oneshot(
            get("/notre-maison")
                .header("cookie", "refresh-token=stale-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Default language: no redirect, but the refreshed (here: cleared)
    // cookies still ride on the response.
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers().get_all(header::SET_COOKIE).iter().count(), 2);
}
