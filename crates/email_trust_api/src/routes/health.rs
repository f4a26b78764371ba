//! Informational and health check routes

use axum::response::Json;
use serde::Serialize;

/// Banner served at the root path
pub const INDEX_MESSAGE: &str = "Email Validator API is running! Use /validate endpoint.";

/// Root endpoint - GET /
pub async fn index_handler() -> &'static str {
    INDEX_MESSAGE
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint - GET /health
///
/// Liveness check only; upstream services are not contacted.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
