//! Cache service trait and error types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::entities::Entry;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cached copy of a visible entry.
///
/// The expiration travels with the target so a hit can be re-checked
/// against the clock before it is served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedEntry {
    pub target: String,
    pub expires_at: i64,
}

impl CachedEntry {
    pub fn into_entry(self, id: &str) -> Entry {
        Entry::new(id, self.target, self.expires_at)
    }
}

impl From<&Entry> for CachedEntry {
    fn from(entry: &Entry) -> Self {
        Self {
            target: entry.target.clone(),
            expires_at: entry.expires_at,
        }
    }
}

/// Read-through cache in front of the entry store.
///
/// A visible entry never changes until it expires, so cached values need no
/// invalidation as long as callers cap the TTL at the entry's remaining lifetime.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the cached entry for `id`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(entry))` on cache hit
    /// - `Ok(None)` on cache miss or error (fail-open behavior)
    async fn get_entry(&self, id: &str) -> CacheResult<Option<CachedEntry>>;

    /// Stores `entry` for `ttl_seconds`. A TTL of zero stores nothing.
    ///
    /// # Errors
    ///
    /// Should not propagate errors to callers. Implementations log and return `Ok(())`.
    async fn set_entry(&self, entry: &Entry, ttl_seconds: u64) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}
