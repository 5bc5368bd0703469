//! Business logic services for the application layer.

pub mod allocator;
pub mod reclaim_service;
pub mod redirect_service;
pub mod upsert_service;

pub use allocator::Allocator;
pub use reclaim_service::ReclaimService;
pub use redirect_service::RedirectService;
pub use upsert_service::UpsertService;
