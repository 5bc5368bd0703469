//! Upsert state machine for client-chosen ids.
//!
//! A write request `(id, target, expires_at)` is classified against whatever
//! the store currently holds for `id`:
//!
//! | Stored row                         | Action                     | Result      |
//! |------------------------------------|----------------------------|-------------|
//! | none, or expired as of `now`       | write the request          | `Created`   |
//! | visible, same target and expiry    | nothing                    | `Updated`   |
//! | visible, any field differs         | nothing                    | `Conflict`  |
//!
//! Stores run [`classify`] and the resulting write inside one critical
//! section per id (a row lock or a map shard lock), so two writers for the
//! same id can never both observe [`PriorState::Absent`].

use crate::domain::entities::{Entry, is_visible};

/// What the store held for an id at the moment a write was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorState {
    /// No row at all.
    Absent,
    /// A row that has not expired yet.
    Visible,
    /// A row that has expired but has not been reclaimed.
    Invisible,
}

impl PriorState {
    /// Classifies an optional stored row at `now`.
    pub fn observe(existing: Option<&Entry>, now: i64) -> Self {
        match existing {
            None => Self::Absent,
            Some(row) if is_visible(row.expires_at, now) => Self::Visible,
            Some(_) => Self::Invisible,
        }
    }
}

/// Result reported for a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The request was stored as a new row, replacing any expired one.
    Created,
    /// A visible row already holds exactly the requested data. Nothing changed.
    Updated,
    /// A visible row holds different data. Nothing changed.
    Conflict,
}

impl Disposition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Conflict => "conflict",
        }
    }

    /// Returns true if the store must persist the request.
    pub fn writes(self) -> bool {
        matches!(self, Self::Created)
    }
}

/// Decides the disposition of `request` given the row currently stored for its id.
///
/// Equality is exact on both `target` and `expires_at`; changing only the
/// expiry of a live entry is a conflict.
pub fn classify(existing: Option<&Entry>, request: &Entry, now: i64) -> Disposition {
    match (PriorState::observe(existing, now), existing) {
        (PriorState::Visible, Some(row)) if row.same_content(request) => Disposition::Updated,
        (PriorState::Visible, _) => Disposition::Conflict,
        (PriorState::Absent | PriorState::Invisible, _) => Disposition::Created,
    }
}

/// Outcome of an atomic upsert as reported by a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub disposition: Disposition,
    pub prior: PriorState,
    /// The row stored for the id once the operation finished.
    pub current: Entry,
}

impl UpsertOutcome {
    /// Builds the outcome for `request` given the row observed inside the critical section.
    pub fn decide(existing: Option<Entry>, request: &Entry, now: i64) -> Self {
        let prior = PriorState::observe(existing.as_ref(), now);
        let disposition = classify(existing.as_ref(), request, now);
        let current = match existing {
            Some(row) if !disposition.writes() => row,
            _ => request.clone(),
        };

        Self {
            disposition,
            prior,
            current,
        }
    }
}
