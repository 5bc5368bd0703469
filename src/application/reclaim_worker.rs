//! Periodic driver for the reclaimer.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::application::services::ReclaimService;
use crate::domain::clock::Clock;
use crate::domain::repositories::EntryRepository;

/// Runs a reclaim pass every `period` until `shutdown` flips to `true` or its
/// sender is dropped.
///
/// The first pass happens one full period after start. A failed pass is
/// logged and the next tick proceeds as usual.
pub async fn run_reclaim_worker<R: EntryRepository + ?Sized>(
    service: Arc<ReclaimService<R>>,
    clock: Arc<dyn Clock>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(period_secs = period.as_secs(), "Reclaim worker started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = clock.now();
                if let Err(e) = service.reclaim(now).await {
                    warn!(error = %e, "Reclaim pass failed, will retry on next tick");
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!("Reclaim worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::ManualClock;
    use crate::domain::repositories::MockEntryRepository;
    use crate::error::StoreError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_worker_runs_on_each_tick_and_survives_failures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);

        let mut repo = MockEntryRepository::new();
        repo.expect_delete_expired().returning(move |now, _| {
            assert_eq!(now, 500);
            match seen.fetch_add(1, Ordering::SeqCst) {
                0 => Err(StoreError::Unavailable("down".to_string())),
                _ => Ok(0),
            }
        });

        let service = Arc::new(ReclaimService::new(Arc::new(repo), 10));
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(500));
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(run_reclaim_worker(
            service,
            clock,
            Duration::from_secs(60),
            rx,
        ));

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_worker_stops_when_sender_dropped() {
        let repo = MockEntryRepository::new();
        let service = Arc::new(ReclaimService::new(Arc::new(repo), 10));
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(0));
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(run_reclaim_worker(
            service,
            clock,
            Duration::from_secs(3600),
            rx,
        ));

        drop(tx);
        handle.await.unwrap();
    }
}
