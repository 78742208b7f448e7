//! Account administration. Routes are ADMIN-only.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use therapia_core::auth::service::RegisterInput;
use therapia_core::models::auth::PublicUser;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::models::RegisterRequest;

/// `POST /api/users`: create an account with any role.
pub async fn create_user_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<PublicUser>)> {
    let user = state
        .auth
        .create_user(RegisterInput {
            email: body.email,
            password: body.password,
            name: body.name,
            role: body.role,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}
