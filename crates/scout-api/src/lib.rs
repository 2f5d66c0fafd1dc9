//! Agent server: thread endpoints plus streamed runs over Server-Sent Events

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod tools;

use axum::{
    http::{HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::handlers::stream;
use crate::middleware::logging;
use crate::routes::{health, threads};
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Threads
        .route("/threads", post(threads::create_thread))
        .route("/threads/:thread_id", get(threads::get_thread))
        .route("/threads/:thread_id/state", get(threads::get_state))
        .route("/threads/:thread_id/messages", get(threads::get_messages))
        .route("/threads/:thread_id/save", post(threads::save_state))
        // Runs
        .route("/threads/:thread_id/runs/stream", post(stream::stream_run));

    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    api_routes
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer(&state.config))
                .layer(TimeoutLayer::new(timeout))
                .layer(axum_middleware::from_fn(logging::log_request)),
        )
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if !config.cors.enabled {
        return CorsLayer::permissive();
    }

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if config.cors.origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors
            .origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}
