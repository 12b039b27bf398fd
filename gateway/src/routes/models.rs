//! Unified model directory endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::catalog::{self, DirectoryEntry};
use crate::AppState;

#[derive(Debug, Serialize)]
struct ModelsResponse {
    models: Vec<DirectoryEntry>,
}

/// GET /api/models - models currently loaded upstream merged with the
/// preset table into one directory.
async fn list_models(State(state): State<Arc<AppState>>) -> Json<ModelsResponse> {
    let loaded = match state.upstream.list_models().await {
        Ok(models) => models,
        Err(e) => {
            // The directory still lists preset entries when the inference
            // service is down.
            tracing::warn!("Failed to list models from inference service: {}", e);
            Vec::new()
        }
    };

    let models = catalog::merge(&loaded, &state.presets.llm);
    Json(ModelsResponse { models })
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/models", get(list_models))
        .with_state(state)
}
