//! Allocator: creates entries under generated ids.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use crate::application::services::UpsertService;
use crate::domain::entities::Entry;
use crate::domain::repositories::EntryRepository;
use crate::domain::upsert::Disposition;
use crate::error::AppError;
use crate::utils::code_generator::IdGenerator;

/// Default retry budget for id collisions.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Generates ids and writes them through the Upsert Engine.
///
/// A generated id that lands on a live entry (either `Updated` or `Conflict`)
/// counts as a collision and a new id is drawn, up to `max_attempts` times.
/// An id whose previous entry has expired is simply reused.
pub struct Allocator<R: EntryRepository + ?Sized> {
    upsert_service: Arc<UpsertService<R>>,
    generator: Arc<dyn IdGenerator>,
    max_attempts: u32,
}

impl<R: EntryRepository + ?Sized> Allocator<R> {
    /// `max_attempts` is raised to 1 if given as 0.
    pub fn new(
        upsert_service: Arc<UpsertService<R>>,
        generator: Arc<dyn IdGenerator>,
        max_attempts: u32,
    ) -> Self {
        Self {
            upsert_service,
            generator,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Stores `target` until `expires_at` under a freshly generated id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Exhausted`] once every attempt has collided, and
    /// propagates storage failures from the first attempt that hits one.
    pub async fn shorten(
        &self,
        target: &str,
        expires_at: i64,
        now: i64,
    ) -> Result<Entry, AppError> {
        for attempt in 1..=self.max_attempts {
            let request = Entry::new(self.generator.generate(), target, expires_at);
            let outcome = self.upsert_service.upsert(&request, now).await?;

            if outcome.disposition == Disposition::Created {
                return Ok(outcome.current);
            }

            metrics::counter!("allocator_collisions_total").increment(1);
            debug!(
                id = %request.id,
                attempt,
                disposition = outcome.disposition.as_str(),
                "Generated id is taken, retrying"
            );
        }

        metrics::counter!("allocator_exhausted_total").increment(1);
        warn!(attempts = self.max_attempts, "Allocator ran out of attempts");

        Err(AppError::exhausted(
            "Failed to allocate a free short id",
            json!({ "attempts": self.max_attempts }),
        ))
    }
}
