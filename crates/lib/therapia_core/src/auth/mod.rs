//! Authentication: credential records, session tokens and password resets.
//!
//! The HTTP layer only talks to [`service::AuthService`]; everything else in
//! this module is the machinery behind it.

pub mod clock;
pub mod config;
pub mod jwt;
pub mod memory;
pub mod notifier;
pub mod password;
pub mod queries;
pub mod reset_code;
pub mod service;
pub mod store;

use thiserror::Error;

pub use config::AuthConfig;
pub use service::AuthService;

/// Authentication and authorization errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("An account with that email already exists")]
    AlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Not permitted")]
    Unauthorized,

    #[error("Invalid or expired reset code")]
    InvalidOrExpiredCode,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Credential store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for AuthError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => AuthError::AlreadyExists,
            _ => AuthError::StoreUnavailable(e.to_string()),
        }
    }
}

/// Normalize an email into its lookup key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
