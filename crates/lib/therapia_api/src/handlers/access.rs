//! Access probe used by the frontend to toggle UI affordances.

use axum::extract::Path;
use axum::{Extension, Json};
use therapia_core::access::Policy;
use therapia_core::models::auth::PermissionKind;

use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::AccessCheckResponse;

/// `GET /api/access/check/{permission}`: would the caller pass a resource
/// route guarded by "ADMIN, or THERAPIST with `permission`"?
pub async fn access_check_handler(
    Extension(user): Extension<AuthenticatedUser>,
    Path(permission): Path<String>,
) -> AppResult<Json<AccessCheckResponse>> {
    let permission = permission.parse::<PermissionKind>()?;
    let allowed = Policy::admin_or_therapist_with(permission).allows(&user.0);
    Ok(Json(AccessCheckResponse {
        permission,
        allowed,
    }))
}
