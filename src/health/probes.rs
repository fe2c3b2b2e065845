use axum::Json;
use serde::{Deserialize, Serialize};

/// Service name reported by the probes.
pub const SERVICE_NAME: &str = "api-gateway";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            service: SERVICE_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// `GET /health/live`
pub async fn live() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// `GET /health/ready`
pub async fn ready() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
