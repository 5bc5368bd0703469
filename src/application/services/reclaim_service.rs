//! Reclaimer: physically removes expired entries.

use std::sync::Arc;

use tracing::{error, info};

use crate::domain::repositories::EntryRepository;
use crate::error::AppError;

/// Default number of rows deleted per statement.
pub const DEFAULT_BATCH_SIZE: i64 = 1000;

/// Deletes rows whose expiration has passed.
///
/// Reads never depend on this having run; it only bounds storage growth.
pub struct ReclaimService<R: EntryRepository + ?Sized> {
    repository: Arc<R>,
    batch_size: i64,
}

impl<R: EntryRepository + ?Sized> ReclaimService<R> {
    /// `batch_size` is raised to 1 if given as 0 or less.
    pub fn new(repository: Arc<R>, batch_size: i64) -> Self {
        Self {
            repository,
            batch_size: batch_size.max(1),
        }
    }

    /// Deletes every row with `expires_at <= now`, one batch at a time, and
    /// returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns the storage error of the failing batch. Batches committed before
    /// the failure stay deleted.
    pub async fn reclaim(&self, now: i64) -> Result<u64, AppError> {
        let mut removed = 0u64;

        loop {
            let batch = match self.repository.delete_expired(now, self.batch_size).await {
                Ok(batch) => batch,
                Err(e) => {
                    metrics::counter!("reclaim_failures_total").increment(1);
                    error!(error = %e, removed, "Reclaim pass failed");
                    return Err(e.into());
                }
            };

            removed += batch;
            if batch < self.batch_size as u64 {
                break;
            }
        }

        metrics::counter!("entries_reclaimed_total").increment(removed);
        info!(removed, now, "Reclaim pass finished");

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockEntryRepository;
    use crate::error::StoreError;
    use mockall::Sequence;

    const NOW: i64 = 1_000;

    #[tokio::test]
    async fn test_single_short_batch() {
        let mut repo = MockEntryRepository::new();
        repo.expect_delete_expired()
            .withf(|now, limit| *now == NOW && *limit == 100)
            .times(1)
            .returning(|_, _| Ok(7));

        let service = ReclaimService::new(Arc::new(repo), 100);

        assert_eq!(service.reclaim(NOW).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_full_batches_repeat_until_short_one() {
        let mut seq = Sequence::new();
        let mut repo = MockEntryRepository::new();
        repo.expect_delete_expired()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_, limit| Ok(limit as u64));
        repo.expect_delete_expired()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(0));

        let service = ReclaimService::new(Arc::new(repo), 10);

        assert_eq!(service.reclaim(NOW).await.unwrap(), 20);
    }

    #[tokio::test]
    async fn test_failure_is_reported() {
        let mut repo = MockEntryRepository::new();
        repo.expect_delete_expired()
            .times(1)
            .returning(|_, _| Err(StoreError::Unavailable("connection reset".to_string())));

        let service = ReclaimService::new(Arc::new(repo), 10);

        let err = service.reclaim(NOW).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_non_positive_batch_size_still_terminates() {
        let mut repo = MockEntryRepository::new();
        repo.expect_delete_expired()
            .withf(|_, limit| *limit == 1)
            .times(1)
            .returning(|_, _| Ok(0));

        let service = ReclaimService::new(Arc::new(repo), 0);

        assert_eq!(service.reclaim(NOW).await.unwrap(), 0);
    }
}
