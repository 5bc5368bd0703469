//! API route configuration.

use crate::api::handlers::{redirect_handler, shorten_handler, upsert_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Entry routes.
///
/// # Endpoints
///
/// - `POST /`      - Create with a generated id
/// - `PUT  /{id}`  - Create or confirm under a chosen id
/// - `GET  /{id}`  - Redirect to the target
pub fn entry_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(shorten_handler))
        .route("/{id}", get(redirect_handler).put(upsert_handler))
}
