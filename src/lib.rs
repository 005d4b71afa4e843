//! AURIS: Acoustic Unit Rig Inspection System
//!
//! Machine-health diagnostics from short audio recordings.
//!
//! ## Architecture
//!
//! - **Audio Normalizer**: container decode and mono/duration normalization
//! - **Feature Extractor**: fixed-shape tabular or spectrogram-image tensors
//! - **Inference Adapter**: opaque classifier behind the [`model::Predictor`] trait
//! - **Decision Engine**: confidence-gated diagnosis and health scoring
//! - **Vibration Synthesizer**: presentation-only time series for charts

pub mod api;
pub mod audio;
pub mod config;
pub mod diagnosis;
pub mod error;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod types;

// Re-export configuration
pub use config::DiagnosticsConfig;

// Re-export commonly used types
pub use types::{
    AnalysisMode, DiagnosticResult, FeatureTensor, Issue, PcmBuffer, Severity, VibrationPoint,
};

// Re-export the pipeline entry points
pub use error::{AnalysisError, ModelLoadError};
pub use model::{DenseModel, Predictor};
pub use pipeline::DiagnosticsEngine;
