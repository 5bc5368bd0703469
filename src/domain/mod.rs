//! Domain layer: entities, the upsert state machine and storage contracts.
//!
//! Nothing in this layer depends on HTTP, SQL or Redis.
//!
//! - [`entities`] - [`entities::Entry`] and the shared [`entities::is_visible`] predicate
//! - [`upsert`] - Created / Updated / Conflict classification of writes
//! - [`clock`] - Injectable time source
//! - [`repositories`] - Entry Store trait implemented by the infrastructure layer

pub mod clock;
pub mod entities;
pub mod repositories;
pub mod upsert;
