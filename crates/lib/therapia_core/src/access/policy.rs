//! Declarative route policies.

use crate::models::auth::{PermissionKind, Role};

use super::Principal;

/// One allowed condition: a set of roles, optionally narrowed to holders of
/// a granted permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub allowed_roles: Vec<Role>,
    pub required_permission: Option<PermissionKind>,
}

impl Clause {
    /// Role-wide clause: membership in any of `roles` suffices.
    pub fn roles(roles: &[Role]) -> Self {
        Self {
            allowed_roles: roles.to_vec(),
            required_permission: None,
        }
    }

    /// Narrow the clause to principals holding `permission` with
    /// `granted = true`.
    pub fn with_permission(mut self, permission: PermissionKind) -> Self {
        self.required_permission = Some(permission);
        self
    }

    pub fn matches(&self, principal: &Principal) -> bool {
        if !self.allowed_roles.contains(&principal.role) {
            return false;
        }
        match self.required_permission {
            None => true,
            Some(permission) => principal.has_permission(permission),
        }
    }
}

/// Ordered list of clauses. Allows when any clause matches; an empty policy
/// allows nobody.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Policy {
    clauses: Vec<Clause>,
}

impl Policy {
    pub fn new(clauses: Vec<Clause>) -> Self {
        Self { clauses }
    }

    /// Append another alternative.
    pub fn or(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    /// ADMIN only.
    pub fn admin_only() -> Self {
        Self::new(vec![Clause::roles(&[Role::Admin])])
    }

    /// ADMIN, or THERAPIST holding `permission`. The shape guarding the
    /// application's resource routes.
    pub fn admin_or_therapist_with(permission: PermissionKind) -> Self {
        Self::admin_only().or(Clause::roles(&[Role::Therapist]).with_permission(permission))
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn allows(&self, principal: &Principal) -> bool {
        self.clauses.iter().any(|clause| clause.matches(principal))
    }
}
