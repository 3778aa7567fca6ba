//! Health check endpoint

use axum::Json;
use gym_common::api::HealthResponse;

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::ok("gym-portal", env!("CARGO_PKG_VERSION")))
}
