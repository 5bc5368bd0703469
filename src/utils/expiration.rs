//! Conversion between RFC 3339 timestamps at the API boundary and the
//! whole-second instants stored with each entry.

use crate::error::AppError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::json;

/// Default upper bound on how far in the future an expiration may be.
pub const DEFAULT_MAX_TTL_DAYS: u64 = 10 * 365;

const SECONDS_PER_DAY: i64 = 86_400;

/// Parses a requested expiration and checks it against `now`.
///
/// Sub-second precision is truncated, so repeating a request always yields
/// the same stored instant.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if the timestamp is not RFC 3339, is not
/// strictly after `now`, or lies more than `max_ttl_days` past `now`.
pub fn parse_expiration(raw: &str, now: i64, max_ttl_days: u64) -> Result<i64, AppError> {
    let parsed = DateTime::parse_from_rfc3339(raw).map_err(|e| {
        AppError::bad_request(
            "Expiration timestamp must be RFC 3339",
            json!({ "expiration_timestamp": raw, "reason": e.to_string() }),
        )
    })?;
    let expires_at = parsed.timestamp();

    if expires_at <= now {
        return Err(AppError::bad_request(
            "Expiration time must be in the future",
            json!({ "expiration_timestamp": raw }),
        ));
    }

    let max_ttl = i64::try_from(max_ttl_days)
        .unwrap_or(i64::MAX)
        .saturating_mul(SECONDS_PER_DAY);
    let max_expires_at = now.saturating_add(max_ttl);
    if expires_at > max_expires_at {
        return Err(AppError::bad_request(
            "Expiration time is too far in the future",
            json!({ "max_expiration_timestamp": format_instant(max_expires_at).ok() }),
        ));
    }

    Ok(expires_at)
}

/// Formats a stored instant as an RFC 3339 UTC timestamp with second precision.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the instant is outside chrono's range.
pub fn format_instant(seconds: i64) -> Result<String, AppError> {
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true))
        .ok_or_else(|| {
            AppError::internal(
                "Stored expiration is out of range",
                json!({ "expires_at": seconds }),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2025-01-01T00:00:00Z
    const NOW: i64 = 1_735_689_600;

    #[test]
    fn test_parse_valid_timestamp() {
        let expires_at = parse_expiration("2025-01-01T00:00:10Z", NOW, 1).unwrap();
        assert_eq!(expires_at, NOW + 10);
    }

    #[test]
    fn test_parse_with_offset() {
        let expires_at = parse_expiration("2025-01-01T01:00:10+01:00", NOW, 1).unwrap();
        assert_eq!(expires_at, NOW + 10);
    }

    #[test]
    fn test_parse_truncates_fraction() {
        let expires_at = parse_expiration("2025-01-01T00:00:10.999Z", NOW, 1).unwrap();
        assert_eq!(expires_at, NOW + 10);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_expiration("invalid-timestamp", NOW, 1).unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn test_parse_rejects_now_and_past() {
        assert!(parse_expiration("2025-01-01T00:00:00Z", NOW, 1).is_err());
        assert!(parse_expiration("2024-12-31T00:00:00Z", NOW, 1).is_err());
    }

    #[test]
    fn test_parse_rejects_beyond_max_ttl() {
        assert!(parse_expiration("2025-01-02T00:00:00Z", NOW, 1).is_ok());
        let err = parse_expiration("2025-01-02T00:00:01Z", NOW, 1).unwrap_err();
        assert!(err.to_string().contains("too far"));
    }

    #[test]
    fn test_format_instant() {
        assert_eq!(format_instant(NOW).unwrap(), "2025-01-01T00:00:00Z");
        assert_eq!(format_instant(NOW + 10).unwrap(), "2025-01-01T00:00:10Z");
    }
}
