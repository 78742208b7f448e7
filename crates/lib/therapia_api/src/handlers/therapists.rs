//! Therapist permission management. Routes are ADMIN-only.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::models::{SetTherapistPermissionsRequest, TherapistPermissionsResponse};

fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("invalid id '{raw}'")))
}

/// `GET /api/therapists/{id}/permissions`: every permission kind with its
/// granted flag.
pub async fn list_permissions_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<TherapistPermissionsResponse>> {
    let therapist_id = parse_id(&id)?;
    let grants = state.auth.therapist_permissions(therapist_id).await?;
    Ok(Json(TherapistPermissionsResponse::new(therapist_id, grants)))
}

/// `PUT /api/therapists/{id}/permissions`: upsert grants.
pub async fn set_permissions_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(body): AppJson<SetTherapistPermissionsRequest>,
) -> AppResult<Json<TherapistPermissionsResponse>> {
    let therapist_id = parse_id(&id)?;
    let grants: Vec<_> = body
        .permissions
        .iter()
        .map(|g| (g.permission, g.granted))
        .collect();
    let all = state
        .auth
        .set_therapist_permissions(therapist_id, &grants)
        .await?;
    Ok(Json(TherapistPermissionsResponse::new(therapist_id, all)))
}
