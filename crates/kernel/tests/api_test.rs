//! Integration tests for the public API endpoints.

// Tests are allowed to use unwrap/expect freely.
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use common::test_app;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, ip: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("x-forwarded-for", ip)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// --- contact ---

#[tokio::test]
async fn contact_sixth_request_within_window_is_rate_limited() {
    let app = test_app(None);

    // Five requests with an empty payload: each passes the limiter and
    // fails validation.
    for _ in 0..5 {
        let response = app
            .clone()
            .oneshot(post_json("/api/contact", "203.0.113.9", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Validation failed");
        assert!(body["fields"].as_array().is_some_and(|f| !f.is_empty()));
    }

    // The sixth is cut off regardless of payload quality.
    let response = app
        .clone()
        .oneshot(post_json("/api/contact", "203.0.113.9", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        response.headers().get(header::RETRY_AFTER).unwrap(),
        "600"
    );

    let body = body_json(response).await;
    assert_eq!(body["error"], "Too many requests");
    assert_eq!(body["retryAfter"], 600);
}

#[tokio::test]
async fn contact_limit_is_per_client_ip() {
    let app = test_app(None);

    for _ in 0..6 {
        app.clone()
            .oneshot(post_json("/api/contact", "198.51.100.1", "{}"))
            .await
            .unwrap();
    }

    // A different client is unaffected.
    let response = app
        .clone()
        .oneshot(post_json("/api/contact", "198.51.100.2", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn contact_malformed_json_is_bad_request() {
    let app = test_app(None);

    let response = app
        .oneshot(post_json("/api/contact", "203.0.113.50", "{not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn contact_field_errors_name_offending_fields() {
    let app = test_app(None);

    let response = app
        .oneshot(post_json(
            "/api/contact",
            "203.0.113.51",
            r#"{"firstName":"Claire","lastName":"Moreau","email":"not-an-email",
                "subject":"Catalogue","message":"Bonjour"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    let fields = body["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0]["field"], "email");
}

// --- revalidate ---

#[tokio::test]
async fn revalidate_without_secret_is_unauthorized() {
    let app = test_app(Some("s3cret"));

    let response = app
        .oneshot(post_json(
            "/api/revalidate",
            "203.0.113.60",
            r#"{"path":"/api/products"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn revalidate_with_wrong_secret_is_unauthorized() {
    let app = test_app(Some("s3cret"));

    let mut request = post_json(
        "/api/revalidate",
        "203.0.113.61",
        r#"{"path":"/api/products"}"#,
    );
    request
        .headers_mut()
        .insert("x-revalidate-secret", "wrong".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn revalidate_with_secret_succeeds() {
    let app = test_app(Some("s3cret"));

    let mut request = post_json(
        "/api/revalidate",
        "203.0.113.62",
        r#"{"path":"/api/products"}"#,
    );
    request
        .headers_mut()
        .insert("x-revalidate-secret", "s3cret".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["revalidated"], true);
    assert_eq!(body["path"], "/api/products");
    assert!(body["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn revalidate_rejects_relative_path() {
    let app = test_app(Some("s3cret"));

    let mut request = post_json("/api/revalidate", "203.0.113.63", r#"{"path":"products"}"#);
    request
        .headers_mut()
        .insert("x-revalidate-secret", "s3cret".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["fields"][0]["field"], "path");
}

#[tokio::test]
async fn revalidate_rate_limit_uses_its_own_window() {
    let app = test_app(None);

    // No secret configured: calls go straight to validation. 10 per minute
    // are allowed; the 11th is limited with Retry-After 60.
    for _ in 0..10 {
        let response = app
            .clone()
            .oneshot(post_json("/api/revalidate", "203.0.113.64", r#"{"path":"/x"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(post_json("/api/revalidate", "203.0.113.64", r#"{"path":"/x"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "60");
}

// --- translate ---

#[tokio::test]
async fn translate_missing_fields_are_reported() {
    let app = test_app(None);

    let response = app
        .oneshot(post_json("/api/translate", "203.0.113.70", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["text", "source", "target"]);
}

#[tokio::test]
async fn translate_upstream_failure_is_bad_gateway() {
    let app = test_app(None);

    // The configured translation endpoint points at a closed port.
    let response = app
        .oneshot(post_json(
            "/api/translate",
            "203.0.113.71",
            r#"{"text":"bonjour","source":"fr","target":"en"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Translation service unavailable");
}

// --- health ---

#[tokio::test]
async fn health_reports_database_probe_outcome() {
    let app = test_app(None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // No database behind the lazy pool: liveness holds, the probe does not.
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    let database = body["database"].as_str().unwrap();
    assert!(database == "error" || database == "unreachable");
}

// --- back office authorization ---

#[tokio::test]
async fn admin_requires_credentials() {
    let app = test_app(None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/admin/products")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_rejects_invalid_token() {
    let app = test_app(None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/admin/products")
                .header("authorization", "Bearer not-a-real-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
