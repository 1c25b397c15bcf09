//! Health check endpoint.
//!
//! Always answers: liveness plus a best-effort datastore connectivity
//! probe bounded at 3 seconds. Returns 503 when the datastore probe does
//! not come back connected.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::db::DatabaseStatus;
use crate::state::AppState;

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
    timestamp: String,
}

/// Health check handler.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = state.database_status().await;

    let status_code = if database == DatabaseStatus::Connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: "ok",
            database: database.as_str(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }),
    )
}

/// Create the health check router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health_check))
}
