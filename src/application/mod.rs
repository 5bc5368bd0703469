//! Application layer: the operations the HTTP surface and the admin CLI invoke.
//!
//! Services are generic over [`crate::domain::repositories::EntryRepository`]
//! so they run against PostgreSQL, the in-memory store or a mock alike.
//!
//! # Available Services
//!
//! - [`services::UpsertService`] - Create-or-update by chosen id
//! - [`services::Allocator`] - Create with a generated id
//! - [`services::RedirectService`] - Resolve an id with lazy expiration
//! - [`services::ReclaimService`] - Delete expired rows
//! - [`reclaim_worker`] - Interval driver for the reclaimer

pub mod reclaim_worker;
pub mod services;
