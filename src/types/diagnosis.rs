//! Diagnostic result types: issues, health assessments, vibration points.

use chrono::{DateTime, Utc};
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::AnalysisMode;

/// Fixed-shape numeric feature representation fed to the model.
///
/// Either a `(1, F)` tabular statistic vector or a `(1, N, N, 1)` normalized
/// time-frequency image. The shape must exactly match the predictor's
/// expected input shape; inference fails on mismatch rather than reshaping.
#[derive(Debug, Clone)]
pub struct FeatureTensor {
    data: ArrayD<f32>,
}

impl FeatureTensor {
    pub fn new(data: ArrayD<f32>) -> Self {
        Self { data }
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn data(&self) -> &ArrayD<f32> {
        &self.data
    }

    /// Flattened view of the tensor in row-major order.
    pub fn as_flat_slice(&self) -> Option<&[f32]> {
        self.data.as_slice()
    }

    /// True if every element is finite (no NaN/Inf).
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

/// Issue severity reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A diagnosed issue, looked up verbatim from the static issue map.
///
/// Severity, description, and recommendation are static text keyed by class
/// identifier — never derived numerically from the score vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Class identifier this issue was diagnosed from.
    pub id: String,
    pub severity: Severity,
    /// Machine component the issue concerns (e.g. "Combustion System").
    pub component: String,
    pub description: String,
    pub recommendation: String,
}

/// One point of the synthetic vibration series used for client-side charting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VibrationPoint {
    /// Time offset in seconds.
    pub time: f64,
    pub amplitude: f64,
    /// Dominant frequency in Hz.
    pub frequency: f64,
}

/// Final diagnostic assessment returned to the client.
///
/// Immutable once constructed; one is created per analysis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticResult {
    /// Overall machine health in `[0, 100]`.
    pub overall_health: u8,
    /// Winning class after confidence gating (may be overridden to "normal").
    pub detected_class: String,
    /// Confidence of the winning class, rounded to 4 decimal places.
    pub confidence: f64,
    /// Normalized probability per catalog class, each rounded to 4 decimals.
    /// BTreeMap keeps the JSON key order stable across runs.
    pub class_probabilities: BTreeMap<String, f64>,
    /// Diagnosed issues — empty when the gate overrides to "normal".
    pub issues: Vec<Issue>,
    /// Synthetic vibration series (100 points quick / 300 deep).
    pub vibration_data: Vec<VibrationPoint>,
    pub mode: AnalysisMode,
    pub timestamp: DateTime<Utc>,
}
