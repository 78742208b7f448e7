//! Authentication and authorization middleware.
//!
//! `require_auth` turns a bearer token into a [`Principal`]; `enforce_policy`
//! checks that principal against the route's [`Policy`]. The first answers
//! 401, the second 403.

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use therapia_core::access::{self, Policy, Principal};
use tracing::debug;

use crate::AppState;
use crate::error::AppError;

/// Request extension carrying the resolved principal.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Principal);

/// Axum middleware: extracts `Authorization: Bearer <token>`, resolves the
/// principal, and injects `AuthenticatedUser` into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthenticated("Missing authorization header".into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthenticated("Invalid authorization scheme".into()))?;

    let principal = state.auth.authenticate_token(token.trim()).await?;

    request.extensions_mut().insert(AuthenticatedUser(principal));

    Ok(next.run(request).await)
}

/// Axum middleware: allows the request only if the route's policy admits the
/// principal placed by [`require_auth`].
pub async fn enforce_policy(
    State(policy): State<Arc<Policy>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| AppError::Unauthenticated("Authentication required".into()))?;

    if let Err(e) = access::authorize(&user.0, &policy) {
        debug!(user_id = %user.0.id, role = %user.0.role, path = %request.uri().path(), "access denied");
        return Err(e.into());
    }

    Ok(next.run(request).await)
}
