//! Application builder: wires router, middleware, and state into an Axum app.

use axum::Router;

use sessionward_core::config::CorsConfig;

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application.
pub fn build_app(state: AppState, cors: &CorsConfig) -> Router {
    build_router(state).layer(build_cors_layer(cors))
}
