//! DTOs for creating and reading entries.

use std::borrow::Cow;

use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::entities::Entry;
use crate::error::AppError;
use crate::utils::expiration::format_instant;

/// Body of `PUT /{id}` and `POST /`.
#[derive(Debug, Deserialize, Validate)]
pub struct EntryRequest {
    /// Redirect target; must be an absolute URL usable as a `Location` header.
    #[validate(
        url(message = "Invalid URL format"),
        custom(function = "validate_location")
    )]
    pub url: String,

    /// RFC 3339 instant at which the link stops resolving.
    pub expiration_timestamp: String,
}

/// Rejects targets that cannot be sent back as a `Location` header.
///
/// URL parsing strips tabs and newlines, so such targets pass the `url` rule
/// but would be stored verbatim.
fn validate_location(url: &str) -> Result<(), ValidationError> {
    HeaderValue::from_str(url).map(|_| ()).map_err(|_| {
        ValidationError::new("location")
            .with_message(Cow::Borrowed("URL contains characters not allowed in a header"))
    })
}

/// Stored state of an entry as returned to clients.
#[derive(Debug, Serialize)]
pub struct EntryResponse {
    pub shortened_url_id: String,
    pub long_url: String,
    pub expiration_timestamp: String,
}

impl TryFrom<&Entry> for EntryResponse {
    type Error = AppError;

    fn try_from(entry: &Entry) -> Result<Self, Self::Error> {
        Ok(Self {
            shortened_url_id: entry.id.clone(),
            long_url: entry.target.clone(),
            expiration_timestamp: format_instant(entry.expires_at)?,
        })
    }
}
