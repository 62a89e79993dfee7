//! Health check and registry inspection endpoints

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use super::ApiState;
use crate::models::ModelRegistry;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Liveness probe - is the service running?
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Resolved model registry
async fn models(State(state): State<Arc<ApiState>>) -> Json<ModelRegistry> {
    Json((*state.models).clone())
}

/// Build health router (liveness only, no state needed)
pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

/// Build registry router
pub fn models_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/models", get(models))
        .with_state(state)
}
