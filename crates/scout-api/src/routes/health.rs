use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: HashMap<String, String>,
}

/// Health check endpoint
///
/// Reports the configured model and whether the checkpointer answers.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let mut services = HashMap::new();

    // A lookup on an unknown thread is the cheapest round trip
    let healthy = match state.store.get_thread("_health_check").await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Checkpointer health check failed");
            false
        }
    };
    let checkpointer = if healthy { "connected" } else { "disconnected" };
    services.insert("checkpointer".to_string(), checkpointer.to_string());
    services.insert("model".to_string(), state.config.llm.model.clone());

    Json(HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    })
}
