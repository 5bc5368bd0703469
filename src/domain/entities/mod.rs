//! Core domain entities.
//!
//! - [`Entry`] - A short id mapped to a target URL with an expiration instant
//! - [`is_visible`] - The single expiration predicate used by reads, writes and reclamation

pub mod entry;

pub use entry::{Entry, EntryCounts, is_visible};
