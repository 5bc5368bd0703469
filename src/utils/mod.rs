//! Utility functions used at the API boundary.
//!
//! - [`code_generator`] - Short id generation and validation
//! - [`expiration`] - RFC 3339 parsing and formatting of expiration instants

pub mod code_generator;
pub mod expiration;
