//! No-op cache implementation for testing or disabled caching.

use super::service::{CacheResult, CacheService, CachedEntry};
use crate::domain::entities::Entry;
use async_trait::async_trait;
use tracing::debug;

/// A cache that never stores anything.
///
/// Used when Redis is not configured or unreachable at startup, and by tests
/// that exercise the store directly.
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get_entry(&self, _id: &str) -> CacheResult<Option<CachedEntry>> {
        Ok(None)
    }

    async fn set_entry(&self, _entry: &Entry, _ttl_seconds: u64) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
