//! Authentication request handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use therapia_core::access::Principal;
use therapia_core::auth::service::{LoginInput, RegisterInput};
use therapia_core::models::auth::PublicUser;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    ForgotPasswordRequest, LoginRequest, MessageResponse, RegisterRequest, ResetPasswordRequest,
    TokenResponse, VerifyResetCodeRequest, VerifyResetCodeResponse,
};

/// `POST /api/auth/register`: self-service sign-up. Always a PARENT
/// account; requesting another role answers 403.
pub async fn register_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<PublicUser>)> {
    let user = state
        .auth
        .register(RegisterInput {
            email: body.email,
            password: body.password,
            name: body.name,
            role: body.role,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /api/auth/login`: exchange email + password for a session token.
pub async fn login_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let out = state
        .auth
        .login(LoginInput {
            email: body.email,
            password: body.password,
            remember_me: body.remember_me,
        })
        .await?;
    Ok(Json(TokenResponse {
        token: out.token,
        token_type: "Bearer".to_string(),
        expires_in: out.expires_in,
        user: out.user,
    }))
}

/// `POST /api/auth/forgot-password`: issue a reset code.
///
/// Same answer whether or not the email is registered.
pub async fn forgot_password_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<ForgotPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    state.auth.request_password_reset(&body.email).await?;
    Ok(Json(MessageResponse::new(
        "If the email is registered, a reset code has been sent",
    )))
}

/// `POST /api/auth/verify-reset-code`: check a code without consuming it.
pub async fn verify_reset_code_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<VerifyResetCodeRequest>,
) -> AppResult<Json<VerifyResetCodeResponse>> {
    if !state.auth.verify_reset_code(&body.email, &body.code).await? {
        return Err(AppError::InvalidOrExpiredCode);
    }
    Ok(Json(VerifyResetCodeResponse { valid: true }))
}

/// `POST /api/auth/reset-password`: set a new password with a reset code.
pub async fn reset_password_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .auth
        .reset_password(&body.email, &body.code, &body.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password updated")))
}

/// `GET /api/auth/me`: the caller's resolved principal.
pub async fn me_handler(Extension(user): Extension<AuthenticatedUser>) -> Json<Principal> {
    Json(user.0)
}
