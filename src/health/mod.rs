/*!
 * # Health Check Module
 *
 * - Basic health check (`/health`) - process is up, no dependencies touched
 * - Readiness check (`/health/ready`) - the database answers a ping
 * - Version (`/health/version`)
 */

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::AppState;

/// Basic health status
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthInfo {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<HealthStatus>,
}

impl HealthInfo {
    fn new(status: HealthStatus, database: Option<HealthStatus>) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            database,
        }
    }
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(simple_health_check))
        .route("/ready", get(readiness_check))
        .route("/version", get(version_info))
}

/// Simple health check response that doesn't require state
pub async fn simple_health_check() -> impl IntoResponse {
    debug!("Health check endpoint called");
    (StatusCode::OK, Json(HealthInfo::new(HealthStatus::Up, None)))
}

/// Ready once the database answers; 503 otherwise.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.db.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthInfo::new(HealthStatus::Up, Some(HealthStatus::Up))),
        ),
        Err(e) => {
            error!("Database health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthInfo::new(HealthStatus::Down, Some(HealthStatus::Down))),
            )
        }
    }
}

pub async fn version_info() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
