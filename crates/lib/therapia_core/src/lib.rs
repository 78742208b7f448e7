//! # therapia_core
//!
//! Core domain logic for Therapia: credential records, session tokens,
//! password-reset codes and the role/permission access decision engine.

pub mod access;
pub mod auth;
pub mod migrate;
pub mod models;
pub mod uuid;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
