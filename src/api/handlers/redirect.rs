//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::code_generator::validate_id;

/// Redirects an id to its target while the entry is live.
///
/// # Endpoint
///
/// `GET /{id}`
///
/// # Response
///
/// 307 Temporary Redirect with `Location` set to the target and
/// `Cache-Control: max-age` set to the seconds left until expiry, so
/// downstream caches never outlive the entry.
///
/// # Errors
///
/// Returns 404 Not Found if the id is malformed, unknown, or expired, and
/// 500 if the stored target is not a valid header value.
pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    if validate_id(&id).is_err() {
        return Err(AppError::not_found("Short link not found", json!({ "id": id })));
    }

    let now = state.clock.now();
    let entry = state.redirect_service.resolve(&id, now).await?;

    let location = HeaderValue::from_str(&entry.target).map_err(|e| {
        AppError::internal(
            "Stored target cannot be used as a redirect",
            json!({ "id": id, "reason": e.to_string() }),
        )
    })?;
    let cache_control = format!("max-age={}", entry.remaining_seconds(now));

    Ok((
        StatusCode::TEMPORARY_REDIRECT,
        [(header::LOCATION, location)],
        [(header::CACHE_CONTROL, cache_control)],
    )
        .into_response())
}
