//! Handler for creating a link under a generated id.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::entry::{EntryRequest, EntryResponse};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::expiration::parse_expiration;

/// Stores a link under a freshly allocated id.
///
/// # Endpoint
///
/// `POST /`
///
/// # Response Codes
///
/// - **201 Created**: Body carries the generated `shortened_url_id`
/// - **400 Bad Request**: Malformed URL or expiration
/// - **500 Internal Server Error**: Every generated id collided (`allocation_exhausted`)
/// - **503 Service Unavailable**: Storage timed out or is unreachable
pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: Result<Json<EntryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EntryResponse>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let now = state.clock.now();
    let expires_at = parse_expiration(&payload.expiration_timestamp, now, state.max_ttl_days)?;

    let entry = state
        .allocator
        .shorten(&payload.url, expires_at, now)
        .await?;

    Ok((StatusCode::CREATED, Json(EntryResponse::try_from(&entry)?)))
}
