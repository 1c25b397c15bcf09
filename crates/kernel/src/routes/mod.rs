//! HTTP route handlers.

pub mod admin;
pub mod catalog;
pub mod contact;
pub mod health;
pub mod helpers;
pub mod revalidate;
pub mod samples;
pub mod translate;

use axum::Router;

use crate::state::AppState;

/// Assemble every route module into one router.
///
/// Middleware layers are applied by the caller (the binary and the
/// integration tests share this).
pub fn app_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(contact::router())
        .merge(samples::router())
        .merge(revalidate::router())
        .merge(translate::router())
        .merge(catalog::router())
        .merge(admin::router())
}
