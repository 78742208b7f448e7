//! Authentication domain models.
//!
//! These are internal domain models, distinct from the HTTP request/response
//! shapes in `therapia_api` (which use camelCase on the wire).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthError;

/// Closed set of user roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Therapist,
    Parent,
}

impl Role {
    /// Storage / wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Therapist => "THERAPIST",
            Role::Parent => "PARENT",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "THERAPIST" => Ok(Role::Therapist),
            "PARENT" => Ok(Role::Parent),
            other => Err(AuthError::Validation(format!("unknown role '{other}'"))),
        }
    }
}

/// Permission kinds a therapist can be granted, one per resource family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionKind {
    ManageStudents,
    ViewAllStudents,
    ManageGuardians,
    ManageSessions,
    ManageTherapyPlans,
    ManageMedications,
    ManageAllergies,
    ManageCategories,
    ManageEvents,
    UploadDocuments,
    ExportData,
}

impl PermissionKind {
    /// Every permission kind, in display order.
    pub const ALL: [PermissionKind; 11] = [
        PermissionKind::ManageStudents,
        PermissionKind::ViewAllStudents,
        PermissionKind::ManageGuardians,
        PermissionKind::ManageSessions,
        PermissionKind::ManageTherapyPlans,
        PermissionKind::ManageMedications,
        PermissionKind::ManageAllergies,
        PermissionKind::ManageCategories,
        PermissionKind::ManageEvents,
        PermissionKind::UploadDocuments,
        PermissionKind::ExportData,
    ];

    /// Storage / wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionKind::ManageStudents => "manage_students",
            PermissionKind::ViewAllStudents => "view_all_students",
            PermissionKind::ManageGuardians => "manage_guardians",
            PermissionKind::ManageSessions => "manage_sessions",
            PermissionKind::ManageTherapyPlans => "manage_therapy_plans",
            PermissionKind::ManageMedications => "manage_medications",
            PermissionKind::ManageAllergies => "manage_allergies",
            PermissionKind::ManageCategories => "manage_categories",
            PermissionKind::ManageEvents => "manage_events",
            PermissionKind::UploadDocuments => "upload_documents",
            PermissionKind::ExportData => "export_data",
        }
    }
}

impl fmt::Display for PermissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionKind {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PermissionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AuthError::Validation(format!("unknown permission '{s}'")))
    }
}

/// An outstanding password-reset code together with its expiry.
///
/// Code and expiry only ever exist as a pair, so a record holds
/// `Option<ResetCode>` rather than two independent optionals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetCode {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl ResetCode {
    /// True when `candidate` equals the stored code and `now` is strictly
    /// before the expiry.
    pub fn accepts(&self, candidate: &str, now: DateTime<Utc>) -> bool {
        now < self.expires_at && constant_time_eq(self.code.as_bytes(), candidate.as_bytes())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Persistent credential record, one per user.
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    pub id: Uuid,
    /// Normalized (trimmed, lower-case) email.
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
    pub reset: Option<ResetCode>,
    pub created_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// Strip the password hash and reset state.
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// Fields needed to insert a new credential record.
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Domain user as exposed outside the credential store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// JWT claims embedded in session tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: user ID (standard JWT `sub` claim).
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
}
