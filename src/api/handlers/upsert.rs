//! Handler for create-or-update by chosen id.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::entry::{EntryRequest, EntryResponse};
use crate::domain::entities::Entry;
use crate::domain::upsert::Disposition;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::code_generator::validate_id;
use crate::utils::expiration::parse_expiration;

/// Stores a link under a client-chosen id.
///
/// # Endpoint
///
/// `PUT /{id}`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/",
///   "expiration_timestamp": "2030-01-01T00:00:00Z"
/// }
/// ```
///
/// # Response Codes
///
/// - **201 Created**: The id was free or its previous entry had expired
/// - **200 OK**: A live entry with the same URL and expiration already exists
/// - **409 Conflict**: A live entry with a different URL or expiration exists
/// - **400 Bad Request**: Malformed id, URL or expiration
/// - **503 Service Unavailable**: Storage timed out or is unreachable
pub async fn upsert_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<EntryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EntryResponse>), AppError> {
    validate_id(&id)?;
    let Json(payload) = payload?;
    payload.validate()?;

    let now = state.clock.now();
    let expires_at = parse_expiration(&payload.expiration_timestamp, now, state.max_ttl_days)?;

    let request = Entry::new(id, payload.url, expires_at);
    let outcome = state.upsert_service.upsert(&request, now).await?;

    let status = match outcome.disposition {
        Disposition::Created => StatusCode::CREATED,
        Disposition::Updated => StatusCode::OK,
        Disposition::Conflict => {
            return Err(AppError::conflict(
                "Short id is already in use with a different URL or expiration",
                json!({ "id": request.id }),
            ));
        }
    };

    Ok((status, Json(EntryResponse::try_from(&outcome.current)?)))
}
