//! Liveness probe.

use axum::Json;
use axum::extract::State;

use crate::AppState;
use crate::models::HealthResponse;

/// `GET /api/health`: reports crate version and credential store reachability.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_connected = state.auth.store_available().await;
    Json(HealthResponse {
        status: if store_connected { "ok" } else { "degraded" }.to_string(),
        version: therapia_core::version().to_string(),
        store_connected,
    })
}
