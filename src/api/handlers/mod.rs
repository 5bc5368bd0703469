//! HTTP request handlers for API endpoints.
//!
//! Handlers read `now` from the clock in [`crate::state::AppState`] once per
//! request and pass it down explicitly.

pub mod health;
pub mod redirect;
pub mod shorten;
pub mod upsert;

pub use health::health_handler;
pub use redirect::redirect_handler;
pub use shorten::shorten_handler;
pub use upsert::upsert_handler;
