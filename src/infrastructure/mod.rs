//! Infrastructure layer for external integrations.
//!
//! Implements the storage contract defined by the domain layer and the
//! redirect cache.
//!
//! # Modules
//!
//! - [`cache`] - Redis and no-op cache implementations
//! - [`persistence`] - PostgreSQL and in-memory entry stores

pub mod cache;
pub mod persistence;
