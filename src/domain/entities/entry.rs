//! Entry entity and the visibility predicate shared by every read and write path.

/// Returns true if an entry expiring at `expires_at` is still usable at `now`.
///
/// Both arguments are seconds since the Unix epoch. "Expires at T" means the
/// last valid second is `T - 1`; at `T` the entry is already gone.
///
/// The redirect path, the upsert classifier and the reclaimer all go through
/// this function. Stores never decide visibility on their own.
pub fn is_visible(expires_at: i64, now: i64) -> bool {
    expires_at > now
}

/// A stored mapping from a short id to a target URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: String,
    pub target: String,
    /// Seconds since the Unix epoch.
    pub expires_at: i64,
}

impl Entry {
    /// Creates a new Entry instance.
    pub fn new(id: impl Into<String>, target: impl Into<String>, expires_at: i64) -> Self {
        Self {
            id: id.into(),
            target: target.into(),
            expires_at,
        }
    }

    /// Returns true if the entry has not expired as of `now`.
    pub fn is_visible_at(&self, now: i64) -> bool {
        is_visible(self.expires_at, now)
    }

    /// Seconds left until expiry, or zero once expired.
    pub fn remaining_seconds(&self, now: i64) -> u64 {
        u64::try_from(self.expires_at - now).unwrap_or(0)
    }

    /// Returns true if `target` and `expires_at` both match `other`.
    ///
    /// The id is not compared; callers only use this for rows stored under the same id.
    pub fn same_content(&self, other: &Entry) -> bool {
        self.target == other.target && self.expires_at == other.expires_at
    }
}

/// Row counts split by visibility, used by operator tooling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryCounts {
    pub live: i64,
    pub expired: i64,
}
