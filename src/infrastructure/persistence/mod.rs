//! Entry Store implementations.
//!
//! # Repositories
//!
//! - [`PgEntryRepository`] - PostgreSQL, durable across restarts
//! - [`InMemoryEntryRepository`] - Sharded in-process map for local runs and tests

pub mod memory_entry_repository;
pub mod pg_entry_repository;

pub use memory_entry_repository::InMemoryEntryRepository;
pub use pg_entry_repository::PgEntryRepository;
