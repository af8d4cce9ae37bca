//! Health check endpoint
//!
//! Optional HTTP server exposing liveness and readiness probes. Readiness
//! reflects the claim store; the chat platform is not probed.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::warn;

use core_kernel::HealthCheckable;

/// Shared state of the health routes
#[derive(Clone)]
pub struct HealthState {
    pub store: Arc<dyn HealthCheckable>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Creates the health router
pub fn router(store: Arc<dyn HealthCheckable>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .layer(TraceLayer::new_for_http())
        .with_state(HealthState { store })
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        message: None,
    })
}

/// Readiness check (includes the claim store)
pub async fn readiness_check(
    State(state): State<HealthState>,
) -> (StatusCode, Json<HealthResponse>) {
    let result = state.store.health_check().await;
    let (code, status) = if result.is_serving() {
        (StatusCode::OK, "ready")
    } else {
        warn!(adapter = %result.adapter_id, message = ?result.message, "claim store not ready");
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            message: result.message,
        }),
    )
}
