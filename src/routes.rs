//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST /`        - Create with a generated id
//! - `PUT  /{id}`    - Create or confirm under a chosen id
//! - `GET  /{id}`    - Redirect while the entry is live
//! - `GET  /health`  - Health check: store and cache
//!
//! `/health` is a static route and wins over `/{id}`, so `health` is never
//! usable as an id.
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Routes and tracing without path normalization.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .merge(api::routes::entry_routes())
        .with_state(state)
        .layer(tracing::layer())
}

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}
