//! Error taxonomy for the diagnostic pipeline.
//!
//! Client-facing failures (bad request, undecodable audio) carry enough
//! detail to fix the request. Internal invariant violations (feature shape,
//! model output shape) are logged with full context and surfaced to the
//! caller as opaque server errors.
//!
//! Low-confidence predictions are deliberately NOT represented here — they
//! are a designed decision-engine outcome (a successful "normal" result),
//! not a failure.

use axum::http::StatusCode;
use thiserror::Error;

/// Everything that can go wrong between receiving a clip and producing a
/// [`crate::types::DiagnosticResult`].
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Bad mode value, missing/empty file. No processing attempted.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Payload exceeds the size cap. Rejected before decode.
    #[error("payload too large: {actual} bytes (limit {limit})")]
    PayloadTooLarge { actual: usize, limit: usize },

    /// The byte stream could not be parsed as audio.
    #[error("failed to decode audio: {0}")]
    Decode(String),

    /// The detected codec has no available decoder.
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// Internal invariant violation — should be unreachable given correct
    /// padding in the normalizer. Fatal for the request, not retried.
    #[error("feature extraction failed: {0}")]
    FeatureExtraction(String),

    /// Feature tensor shape does not match the model's expected input.
    /// Never silently reshaped; signals an extractor/model configuration
    /// mismatch.
    #[error("feature shape mismatch: model expects {expected:?}, extractor produced {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Score vector length does not match the class catalog. Signals a
    /// model/catalog version skew; never silently truncated or padded.
    #[error("invalid model output: expected {expected} scores, got {actual}")]
    InvalidModelOutput { expected: usize, actual: usize },
}

impl AnalysisError {
    /// HTTP status this error maps to at the API boundary.
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::Decode(_) | Self::UnsupportedFormat(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::FeatureExtraction(_)
            | Self::ShapeMismatch { .. }
            | Self::InvalidModelOutput { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for the response envelope.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            Self::Decode(_) => "DECODE_FAILED",
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::FeatureExtraction(_) | Self::ShapeMismatch { .. } => "INTERNAL_ERROR",
            Self::InvalidModelOutput { .. } => "MODEL_OUTPUT_INVALID",
        }
    }

    /// True when the message is safe to show to the client. Server-side
    /// invariant violations get an opaque message instead.
    pub const fn is_client_facing(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_)
                | Self::PayloadTooLarge { .. }
                | Self::Decode(_)
                | Self::UnsupportedFormat(_)
        )
    }
}

/// Errors raised while loading model weights at startup.
///
/// Any of these is fatal: the process must not serve requests with no model.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("failed to read model file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("inconsistent model weights: {0}")]
    Inconsistent(String),
}
