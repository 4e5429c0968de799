//! HTTP API for the control service.
//!
//! Two routes: `POST /api/deploy` runs the pipeline synchronously and
//! answers with the terminal status; `GET /health` is a liveness probe.

mod deploy;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use serde::Serialize;

use crate::deployment::DeploymentManager;

pub use deploy::{error_to_status, DeployResponse, ErrorResponse};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The deployment pipeline.
    pub manager: Arc<DeploymentManager>,
}

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/deploy", post(deploy::deploy))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "healthy",
        service: env!("CARGO_PKG_NAME"),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Health response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    timestamp: String,
}
