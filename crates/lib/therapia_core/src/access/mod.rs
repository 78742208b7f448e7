//! Access decision engine.
//!
//! A request's [`Principal`] is resolved once by
//! [`AuthService::authenticate_token`](crate::auth::AuthService::authenticate_token)
//! and then checked against the [`Policy`] attached to the route.

pub mod policy;

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::auth::AuthError;
use crate::models::auth::{PermissionKind, Role};

pub use policy::{Clause, Policy};

/// Authenticated identity attached to one request. Never mutated after
/// resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    /// Therapist grants; always empty for other roles.
    pub permissions: HashMap<PermissionKind, bool>,
}

impl Principal {
    /// True only for an explicit `granted = true` entry.
    pub fn has_permission(&self, permission: PermissionKind) -> bool {
        self.permissions.get(&permission).copied().unwrap_or(false)
    }
}

/// Evaluate `policy` for `principal`. Deny is [`AuthError::Unauthorized`].
pub fn authorize(principal: &Principal, policy: &Policy) -> Result<(), AuthError> {
    if policy.allows(principal) {
        Ok(())
    } else {
        Err(AuthError::Unauthorized)
    }
}
