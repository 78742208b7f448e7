//! Request handlers.

pub mod access;
pub mod auth;
pub mod health;
pub mod therapists;
pub mod users;
