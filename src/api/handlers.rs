//! API handlers — consistent envelope, typed responses, ISO-8601 timestamps.
//!
//! All handlers return `Response` via [`ApiResponse::ok`] or [`ApiErrorResponse`].
//! The analyze handler is the only ingestion surface; everything heavy runs
//! inside `spawn_blocking` so the runtime stays responsive under load.

use axum::extract::{Multipart, State};
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::error;

use super::envelope::{ApiErrorResponse, ApiResponse};
use crate::diagnosis::{catalog, CLASSES};
use crate::pipeline::DiagnosticsEngine;
use crate::types::{AnalysisMode, Issue};

/// Shared handler state. Cloning is cheap; the engine is all `Arc` inside.
#[derive(Clone)]
pub struct ApiState {
    pub engine: DiagnosticsEngine,
}

// ============================================================================
// Response types
// ============================================================================

/// Liveness payload for `/api/v1/health`.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub feature_strategy: String,
    pub classes: usize,
    pub timestamp: DateTime<Utc>,
}

/// One catalog entry for `/api/v1/classes`.
#[derive(Debug, Serialize)]
pub struct ClassInfo {
    pub id: &'static str,
    pub actionable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<Issue>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Liveness check. Reports the configured feature strategy so operators can
/// confirm which extractor the deployment is running.
pub async fn get_health(State(state): State<ApiState>) -> Response {
    ApiResponse::ok(HealthStatus {
        status: "ok",
        feature_strategy: format!("{:?}", state.engine.config().features.strategy).to_lowercase(),
        classes: CLASSES.len(),
        timestamp: Utc::now(),
    })
}

/// Expose the class catalog with actionable-issue metadata.
pub async fn get_classes() -> Response {
    let classes: Vec<ClassInfo> = CLASSES
        .iter()
        .map(|&id| ClassInfo {
            id,
            actionable: catalog::issue_for(id).is_some(),
            issue: catalog::issue_for(id).cloned(),
        })
        .collect();

    ApiResponse::ok(classes)
}

/// Analyze one uploaded audio clip.
///
/// Multipart fields, both required: `file` (the audio bytes, any supported
/// container) and `mode` (`"quick"` or `"deep"`). An invalid mode is
/// rejected as soon as the field is read, before any audio is touched.
pub async fn post_analyze(
    State(state): State<ApiState>,
    mut multipart: Multipart,
) -> Response {
    let mut mode: Option<AnalysisMode> = None;
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut content_type: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return ApiErrorResponse::bad_request(format!("malformed multipart body: {e}"))
            }
        };

        match field.name() {
            Some("mode") => {
                let text = match field.text().await {
                    Ok(text) => text,
                    Err(e) => {
                        return ApiErrorResponse::bad_request(format!(
                            "could not read mode field: {e}"
                        ))
                    }
                };
                match AnalysisMode::parse(&text) {
                    Ok(parsed) => mode = Some(parsed),
                    Err(e) => return ApiErrorResponse::from_analysis_error(&e),
                }
            }
            Some("file") => {
                content_type = field.content_type().map(str::to_string);
                match field.bytes().await {
                    Ok(bytes) => file_bytes = Some(bytes.to_vec()),
                    Err(e) => {
                        return ApiErrorResponse::bad_request(format!(
                            "could not read file field: {e}"
                        ))
                    }
                }
            }
            _ => {}
        }
    }

    let Some(mode) = mode else {
        return ApiErrorResponse::bad_request("missing required field: mode");
    };
    let Some(bytes) = file_bytes else {
        return ApiErrorResponse::bad_request("missing required field: file");
    };

    // Decode + DSP + inference are CPU-bound; keep them off the runtime.
    let engine = state.engine.clone();
    let joined = tokio::task::spawn_blocking(move || {
        engine.analyze(bytes, content_type.as_deref(), mode)
    })
    .await;

    match joined {
        Ok(Ok(result)) => ApiResponse::ok(result),
        Ok(Err(e)) => ApiErrorResponse::from_analysis_error(&e),
        Err(e) => {
            error!(error = %e, "Analysis task panicked or was cancelled");
            ApiErrorResponse::internal("analysis could not be completed")
        }
    }
}
