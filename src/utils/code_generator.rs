//! Short id generation and validation utilities.
//!
//! Ids are ASCII alphanumeric strings between [`MIN_ID_LENGTH`] and
//! [`MAX_ID_LENGTH`] characters. Client-chosen ids are checked with
//! [`validate_id`]; allocator-chosen ids come from an [`IdGenerator`].

use crate::error::AppError;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde_json::json;

/// Shortest accepted id.
pub const MIN_ID_LENGTH: usize = 6;

/// Longest accepted id.
pub const MAX_ID_LENGTH: usize = 16;

/// Default length of generated ids.
///
/// 62^8 possible ids keeps collisions rare for any realistic table size.
pub const DEFAULT_GENERATED_LENGTH: usize = 8;

/// Source of candidate ids for the allocator.
///
/// Implementations are pure generators that never touch storage; the
/// allocator handles collisions.
#[cfg_attr(test, mockall::automock)]
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random fixed-length alphanumeric ids drawn from the thread-local CSPRNG.
#[derive(Debug, Clone)]
pub struct RandomIdGenerator {
    length: usize,
}

impl RandomIdGenerator {
    /// Creates a generator producing ids of `length` characters.
    ///
    /// The length is clamped into the accepted id range.
    pub fn new(length: usize) -> Self {
        Self {
            length: length.clamp(MIN_ID_LENGTH, MAX_ID_LENGTH),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomIdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_GENERATED_LENGTH)
    }
}

impl IdGenerator for RandomIdGenerator {
    fn generate(&self) -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }
}

/// Validates a client-chosen id.
///
/// # Rules
///
/// - Length: 6-16 characters
/// - Allowed characters: ASCII letters and digits
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_id(id: &str) -> Result<(), AppError> {
    if !(MIN_ID_LENGTH..=MAX_ID_LENGTH).contains(&id.len()) {
        return Err(AppError::bad_request(
            format!("Short id must be {MIN_ID_LENGTH}-{MAX_ID_LENGTH} characters"),
            json!({ "provided_length": id.len() }),
        ));
    }

    let invalid_chars: String = id.chars().filter(|c| !c.is_ascii_alphanumeric()).collect();
    if !invalid_chars.is_empty() {
        return Err(AppError::bad_request(
            "Short id can only contain letters and digits",
            json!({ "invalid_chars": invalid_chars }),
        ));
    }

    Ok(())
}
