//! In-process implementation of the entry repository.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry as Slot;

use crate::domain::entities::{Entry, EntryCounts};
use crate::domain::repositories::EntryRepository;
use crate::domain::upsert::UpsertOutcome;
use crate::error::StoreError;

/// Entry store backed by a sharded concurrent map.
///
/// An upsert holds the shard lock for its id while it classifies and writes,
/// so two writers for the same id are serialized and writers for other ids
/// proceed in parallel. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryEntryRepository {
    entries: DashMap<String, Entry>,
}

impl InMemoryEntryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows, visible or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl EntryRepository for InMemoryEntryRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Entry>, StoreError> {
        Ok(self.entries.get(id).map(|row| row.value().clone()))
    }

    async fn upsert(&self, request: &Entry, now: i64) -> Result<UpsertOutcome, StoreError> {
        let outcome = match self.entries.entry(request.id.clone()) {
            Slot::Occupied(mut slot) => {
                let outcome = UpsertOutcome::decide(Some(slot.get().clone()), request, now);
                if outcome.disposition.writes() {
                    slot.insert(request.clone());
                }
                outcome
            }
            Slot::Vacant(slot) => {
                let outcome = UpsertOutcome::decide(None, request, now);
                slot.insert(request.clone());
                outcome
            }
        };

        Ok(outcome)
    }

    async fn delete_expired(&self, now: i64, limit: i64) -> Result<u64, StoreError> {
        let limit = u64::try_from(limit).unwrap_or(0);
        let mut removed = 0u64;

        self.entries.retain(|_, row| {
            if removed < limit && !row.is_visible_at(now) {
                removed += 1;
                false
            } else {
                true
            }
        });

        Ok(removed)
    }

    async fn count(&self, now: i64) -> Result<EntryCounts, StoreError> {
        let mut counts = EntryCounts::default();
        for row in self.entries.iter() {
            if row.is_visible_at(now) {
                counts.live += 1;
            } else {
                counts.expired += 1;
            }
        }
        Ok(counts)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
