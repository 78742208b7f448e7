//! Request and response bodies (camelCase on the wire).

use serde::{Deserialize, Serialize};
use therapia_core::models::auth::{PermissionKind, PublicUser, Role};
use uuid::Uuid;

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store_connected: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    /// Seconds until expiry.
    pub expires_in: i64,
    pub user: PublicUser,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyResetCodeRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResetCodeResponse {
    pub valid: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccessCheckResponse {
    pub permission: PermissionKind,
    pub allowed: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub permission: PermissionKind,
    pub granted: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TherapistPermissionsResponse {
    pub therapist_id: Uuid,
    pub permissions: Vec<PermissionGrant>,
}

impl TherapistPermissionsResponse {
    pub fn new(therapist_id: Uuid, grants: Vec<(PermissionKind, bool)>) -> Self {
        Self {
            therapist_id,
            permissions: grants
                .into_iter()
                .map(|(permission, granted)| PermissionGrant {
                    permission,
                    granted,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetTherapistPermissionsRequest {
    pub permissions: Vec<PermissionGrant>,
}
