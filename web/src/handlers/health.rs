//! Health check endpoints.
//!
//! Used by load balancers and orchestrators to verify service health.

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

/// API banner.
///
/// ```text
/// GET /api/v1/
/// ```
#[allow(clippy::unused_async)]
pub async fn welcome() -> Json<Value> {
    Json(json!({ "message": "Welcome to Online Event Ticketing System API" }))
}

/// Liveness: the process is up. Dependencies are not checked.
///
/// ```text
/// GET /api/v1/health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Readiness: the database answers.
///
/// # Status Codes
///
/// - 200 OK: `{"status": "ready"}`
/// - 503 Service Unavailable: `{"status": "unavailable"}`
///
/// ```text
/// GET /api/v1/ready
/// ```
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.health.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}
