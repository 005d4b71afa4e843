//! API route definitions
//!
//! Endpoints for the audio diagnostics service:
//! - POST /api/v1/analyze - run the full diagnostic pipeline on an upload
//! - GET  /api/v1/classes - class catalog with issue metadata
//! - GET  /api/v1/health  - liveness and deployment info

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{self, ApiState};

/// Create all versioned API routes.
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/analyze", post(handlers::post_analyze))
        .route("/classes", get(handlers::get_classes))
        .route("/health", get(handlers::get_health))
        .with_state(state)
}

/// Legacy health endpoint at root level, for load balancer probes.
pub fn legacy_routes(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state)
}
