//! In-process credential store.
//!
//! Keeps records in a [`DashMap`] keyed by normalized email. Each mutation
//! happens under the entry's shard lock, which gives the same
//! all-fields-or-nothing guarantee as the single-statement SQL updates.
//! Used by tests and for running the API without Postgres.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use super::AuthError;
use super::store::CredentialStore;
use crate::models::auth::{CredentialRecord, NewCredential, PermissionKind, ResetCode};

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    users: DashMap<String, CredentialRecord>,
    permissions: DashMap<Uuid, HashMap<PermissionKind, bool>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn insert(&self, new: NewCredential) -> Result<CredentialRecord, AuthError> {
        match self.users.entry(new.email.clone()) {
            Entry::Occupied(_) => Err(AuthError::AlreadyExists),
            Entry::Vacant(slot) => {
                let record = CredentialRecord {
                    id: new.id,
                    email: new.email,
                    name: new.name,
                    password_hash: new.password_hash,
                    role: new.role,
                    reset: None,
                    created_at: new.created_at,
                };
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, AuthError> {
        Ok(self.users.get(email).map(|r| r.value().clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CredentialRecord>, AuthError> {
        Ok(self
            .users
            .iter()
            .find(|r| r.value().id == id)
            .map(|r| r.value().clone()))
    }

    async fn set_reset_code(&self, email: &str, reset: &ResetCode) -> Result<bool, AuthError> {
        match self.users.get_mut(email) {
            Some(mut record) => {
                record.reset = Some(reset.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn complete_password_reset(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
        new_password_hash: &str,
    ) -> Result<bool, AuthError> {
        let Some(mut record) = self.users.get_mut(email) else {
            return Ok(false);
        };
        let accepted = record
            .reset
            .as_ref()
            .is_some_and(|reset| reset.accepts(code, now));
        if !accepted {
            return Ok(false);
        }
        record.password_hash = new_password_hash.to_string();
        record.reset = None;
        Ok(true)
    }

    async fn permissions_for(
        &self,
        user_id: Uuid,
    ) -> Result<HashMap<PermissionKind, bool>, AuthError> {
        Ok(self
            .permissions
            .get(&user_id)
            .map(|grants| grants.value().clone())
            .unwrap_or_default())
    }

    async fn set_permission(
        &self,
        user_id: Uuid,
        kind: PermissionKind,
        granted: bool,
    ) -> Result<(), AuthError> {
        self.permissions
            .entry(user_id)
            .or_default()
            .insert(kind, granted);
        Ok(())
    }

    async fn ping(&self) -> bool {
        true
    }
}
