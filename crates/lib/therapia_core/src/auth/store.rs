//! Credential store abstraction.
//!
//! Every mutating method is a single atomic update: no caller can observe a
//! record with a new code but an old expiry, or a new password with the old
//! code still attached.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::AuthError;
use crate::models::auth::{CredentialRecord, NewCredential, PermissionKind, ResetCode};

/// Persistent home of credential records and therapist permission grants.
///
/// Emails passed in are already normalized.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a new record. Fails with [`AuthError::AlreadyExists`] when the
    /// email is taken.
    async fn insert(&self, new: NewCredential) -> Result<CredentialRecord, AuthError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, AuthError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CredentialRecord>, AuthError>;

    /// Replace any outstanding reset code for `email`. Returns `false` when no
    /// record matches.
    async fn set_reset_code(&self, email: &str, reset: &ResetCode) -> Result<bool, AuthError>;

    /// Set a new password hash and clear the reset code, but only if `code` is
    /// still the outstanding code for `email` and has not expired at `now`.
    /// Returns `false` when the guard fails and nothing was written.
    async fn complete_password_reset(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
        new_password_hash: &str,
    ) -> Result<bool, AuthError>;

    /// Current permission grants for a user. Kinds without a row are absent.
    async fn permissions_for(&self, user_id: Uuid)
    -> Result<HashMap<PermissionKind, bool>, AuthError>;

    /// Upsert a single grant.
    async fn set_permission(
        &self,
        user_id: Uuid,
        kind: PermissionKind,
        granted: bool,
    ) -> Result<(), AuthError>;

    /// Cheap connectivity probe.
    async fn ping(&self) -> bool;
}
