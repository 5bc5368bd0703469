//! Upsert Engine: create, confirm or reject a write for a chosen id.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::entities::Entry;
use crate::domain::repositories::EntryRepository;
use crate::domain::upsert::{Disposition, UpsertOutcome};
use crate::error::AppError;

/// Runs the create / idempotent-update / conflict state machine.
///
/// Classification and the resulting write happen inside the repository's
/// per-id critical section. This service reports the result and never retries:
/// a [`Disposition::Conflict`] is an outcome, not an error, and storage
/// failures are surfaced to the caller as they are.
pub struct UpsertService<R: EntryRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: EntryRepository + ?Sized> UpsertService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Writes `request` as of `now` and reports how the store classified it.
    ///
    /// The request is assumed to be well formed; validation happens at the
    /// boundary before this is called.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] on transient storage failures and
    /// [`AppError::Internal`] on other storage failures.
    pub async fn upsert(&self, request: &Entry, now: i64) -> Result<UpsertOutcome, AppError> {
        let outcome = self.repository.upsert(request, now).await?;

        metrics::counter!(
            "entries_upserted_total",
            "disposition" => outcome.disposition.as_str()
        )
        .increment(1);

        match outcome.disposition {
            Disposition::Created => info!(
                id = %request.id,
                expires_at = request.expires_at,
                prior = ?outcome.prior,
                "Entry created"
            ),
            Disposition::Updated => debug!(id = %request.id, "Identical write, nothing changed"),
            Disposition::Conflict => info!(
                id = %request.id,
                stored_expires_at = outcome.current.expires_at,
                "Write conflicts with a live entry"
            ),
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockEntryRepository;
    use crate::domain::upsert::PriorState;
    use crate::error::StoreError;

    const NOW: i64 = 1_000;

    #[tokio::test]
    async fn test_upsert_passes_request_and_now_to_store() {
        let mut mock_repo = MockEntryRepository::new();
        mock_repo
            .expect_upsert()
            .withf(|request, now| request.id == "abc123" && *now == NOW)
            .times(1)
            .returning(|request, now| Ok(UpsertOutcome::decide(None, request, now)));

        let service = UpsertService::new(Arc::new(mock_repo));
        let request = Entry::new("abc123", "https://example.com/", NOW + 10);

        let outcome = service.upsert(&request, NOW).await.unwrap();

        assert_eq!(outcome.disposition, Disposition::Created);
        assert_eq!(outcome.prior, PriorState::Absent);
        assert_eq!(outcome.current, request);
    }

    #[tokio::test]
    async fn test_conflict_is_an_outcome_not_an_error() {
        let stored = Entry::new("abc123", "https://example.com/", NOW + 10);
        let mut mock_repo = MockEntryRepository::new();
        mock_repo
            .expect_upsert()
            .times(1)
            .returning(move |request, now| {
                Ok(UpsertOutcome::decide(Some(stored.clone()), request, now))
            });

        let service = UpsertService::new(Arc::new(mock_repo));
        let request = Entry::new("abc123", "https://example.com/", NOW + 11);

        let outcome = service.upsert(&request, NOW).await.unwrap();

        assert_eq!(outcome.disposition, Disposition::Conflict);
        assert_eq!(outcome.current.expires_at, NOW + 10);
    }

    #[tokio::test]
    async fn test_storage_timeout_is_not_retried() {
        let mut mock_repo = MockEntryRepository::new();
        mock_repo
            .expect_upsert()
            .times(1)
            .returning(|_, _| Err(StoreError::Timeout("upsert exceeded 5000ms".to_string())));

        let service = UpsertService::new(Arc::new(mock_repo));
        let request = Entry::new("abc123", "https://example.com/", NOW + 10);

        let err = service.upsert(&request, NOW).await.unwrap_err();

        assert!(matches!(err, AppError::Unavailable { .. }));
        assert!(err.is_retryable());
    }
}
