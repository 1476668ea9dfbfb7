//! Health check handlers

use axum::Json;
use serde::Serialize;

/// Public health check response
///
/// Simple status indicator for load balancers and health monitoring.
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    /// Status indicator (always "ok")
    pub status: String,
}

/// API banner returned by `GET /api`
#[derive(Debug, Serialize)]
pub struct ApiInfoResponse {
    pub message: String,
    pub version: String,
}

/// GET /api/health
///
/// # Example
/// ```bash
/// curl http://localhost:5000/api/health
/// # Returns: {"status":"ok"}
/// ```
pub async fn health_check() -> Json<HealthCheckResponse> {
    tracing::debug!("Health check requested - system operational");
    Json(HealthCheckResponse {
        status: "ok".to_string(),
    })
}

/// GET /api
pub async fn api_info() -> Json<ApiInfoResponse> {
    Json(ApiInfoResponse {
        message: "Bambou Glow Up API is running!".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
