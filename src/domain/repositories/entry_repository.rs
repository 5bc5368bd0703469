//! Repository trait for the Entry Store.

use crate::domain::entities::{Entry, EntryCounts};
use crate::domain::upsert::UpsertOutcome;
use crate::error::StoreError;
use async_trait::async_trait;

/// Durable table of entries keyed by id.
///
/// The store persists rows and enforces atomicity; it never decides
/// visibility itself. Classification is delegated to
/// [`crate::domain::upsert::UpsertOutcome::decide`] and expiry checks to
/// [`crate::domain::entities::is_visible`].
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgEntryRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryEntryRepository`] - In-process map
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Returns the raw row stored for `id`, expired or not.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if storage is unavailable, times out, or holds an undecodable row.
    async fn find_by_id(&self, id: &str) -> Result<Option<Entry>, StoreError>;

    /// Atomically classifies `request` against the stored row and writes it when
    /// the classification is `Created`.
    ///
    /// Reading the stored row, classifying and writing happen in one critical
    /// section scoped to `request.id`. Writers for different ids never block
    /// each other.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on storage failures. Nothing is retried here.
    async fn upsert(&self, request: &Entry, now: i64) -> Result<UpsertOutcome, StoreError>;

    /// Deletes up to `limit` rows with `expires_at <= now`, returning how many were removed.
    ///
    /// Rows a concurrent upsert currently holds are skipped; such rows are
    /// being replaced anyway.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on storage failures.
    async fn delete_expired(&self, now: i64, limit: i64) -> Result<u64, StoreError>;

    /// Counts rows that are visible and rows that are expired as of `now`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on storage failures.
    async fn count(&self, now: i64) -> Result<EntryCounts, StoreError>;

    /// Checks that the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if it is not.
    async fn ping(&self) -> Result<(), StoreError>;
}
