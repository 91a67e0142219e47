//! Service banner and health check endpoints.

use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize)]
pub struct BannerResponse {
    pub success: bool,
    pub message: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// GET /: identifies the service.
pub async fn root() -> Json<BannerResponse> {
    Json(BannerResponse {
        success: true,
        message: "Coffee order API server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /health: returns system health status.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        status: "healthy",
        timestamp: Utc::now(),
    })
}
