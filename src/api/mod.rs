//! REST API module using Axum
//!
//! Provides HTTP endpoints for the audio diagnostics service:
//! - v1 API with consistent envelope under `/api/v1`
//! - legacy `/health` at root for load balancer probes
//!
//! Uploads are size-limited at the transport layer before any handler runs.

pub mod envelope;
pub mod handlers;
mod routes;

pub use handlers::ApiState;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Build a CORS layer that is restrictive by default (same-origin only).
///
/// Set `AURIS_CORS_ORIGINS` to a comma-separated list of allowed origins
/// for development (e.g., `http://localhost:5173` for a local frontend).
fn build_cors_layer() -> CorsLayer {
    match std::env::var("AURIS_CORS_ORIGINS") {
        Ok(origins) => {
            let allowed: Vec<_> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            tracing::info!(origins = %origins, "CORS: allowing configured origins");
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE])
        }
        Err(_) => CorsLayer::new()
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE]),
    }
}

/// Create the complete application router.
///
/// `max_payload_bytes` caps the request body; multipart framing overhead
/// gets a small allowance on top so a file at exactly the limit still fits.
pub fn create_app(state: ApiState, max_payload_bytes: usize) -> Router {
    let cors = build_cors_layer();
    let body_limit = max_payload_bytes + 16 * 1024;

    Router::new()
        .nest("/api/v1", routes::api_routes(state.clone()))
        .merge(routes::legacy_routes(state))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
