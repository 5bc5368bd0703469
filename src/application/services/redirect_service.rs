//! Redirect Resolver: maps an id to its target while the entry is visible.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use crate::domain::entities::{Entry, is_visible};
use crate::domain::repositories::EntryRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

/// Read path with lazy expiration.
///
/// An expired row is reported as not found whether or not it has been
/// reclaimed yet. Nothing is written to the store on this path.
pub struct RedirectService<R: EntryRepository + ?Sized> {
    repository: Arc<R>,
    cache: Arc<dyn CacheService>,
    cache_ttl_seconds: u64,
}

impl<R: EntryRepository + ?Sized> RedirectService<R> {
    pub fn new(repository: Arc<R>, cache: Arc<dyn CacheService>, cache_ttl_seconds: u64) -> Self {
        Self {
            repository,
            cache,
            cache_ttl_seconds,
        }
    }

    /// Returns the entry for `id` if it is visible at `now`.
    ///
    /// Cache hits are re-checked against `now`. Misses are filled with a TTL
    /// no longer than the entry's remaining lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if there is no row or it has expired,
    /// and a storage error if the lookup fails.
    pub async fn resolve(&self, id: &str, now: i64) -> Result<Entry, AppError> {
        if let Ok(Some(cached)) = self.cache.get_entry(id).await
            && is_visible(cached.expires_at, now)
        {
            return Ok(cached.into_entry(id));
        }

        let entry = self
            .repository
            .find_by_id(id)
            .await?
            .filter(|entry| entry.is_visible_at(now))
            .ok_or_else(|| {
                debug!(id, "No visible entry");
                AppError::not_found("Short link not found", json!({ "id": id }))
            })?;

        let ttl = self.cache_ttl_seconds.min(entry.remaining_seconds(now));
        if let Err(e) = self.cache.set_entry(&entry, ttl).await {
            warn!(id, error = %e, "Failed to cache entry");
        }

        Ok(entry)
    }
}
