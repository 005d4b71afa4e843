//! Decision Engine: raw score vector → stable diagnostic decision.
//!
//! A pure, total function over correctly shaped score vectors: clip,
//! renormalize, pick the winner, gate on confidence, derive the health
//! score. No hidden randomness — identical input yields a bit-identical
//! decision. Invalid-length vectors are rejected upstream at the inference
//! adapter boundary, never here.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::debug;

use super::catalog::{self, CLASSES, NORMAL_CLASS};
use crate::config::defaults::{MIN_FAULT_HEALTH, PROBABILITY_DECIMALS, SCORE_EPSILON};
use crate::types::{AnalysisMode, DiagnosticResult, Issue, VibrationPoint};

/// The decision core without presentation data. [`decide`] wraps this into a
/// full [`DiagnosticResult`].
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub detected_class: String,
    pub confidence: f64,
    pub class_probabilities: BTreeMap<String, f64>,
    pub issues: Vec<Issue>,
    pub overall_health: u8,
}

/// Round to the wire precision (4 decimal places).
fn round_probability(value: f64) -> f64 {
    let factor = 10f64.powi(PROBABILITY_DECIMALS as i32);
    (value * factor).round() / factor
}

/// Clip scores into `[ε, 1]` and renormalize to a probability distribution.
///
/// The model's raw output is not guaranteed normalized; the clipped and
/// renormalized vector is the canonical distribution returned to the caller.
fn normalize_scores(raw: &[f32]) -> Vec<f64> {
    let clipped: Vec<f64> = raw
        .iter()
        .map(|&s| f64::from(s).clamp(SCORE_EPSILON, 1.0))
        .collect();
    let sum: f64 = clipped.iter().sum();
    clipped.into_iter().map(|s| s / sum).collect()
}

/// Derive the integer health score from the final label and confidence.
///
/// Normal: `90 + confidence * 10` — rewards confident normalcy (90–100).
/// Fault: `max(30, (1 - confidence) * 100)` — higher fault confidence means
/// lower health, floored so one clip never implies total failure.
fn health_score(is_normal: bool, confidence: f64) -> u8 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let score = if is_normal {
        (90.0 + confidence * 10.0) as i64
    } else {
        ((1.0 - confidence) * 100.0).max(f64::from(MIN_FAULT_HEALTH)) as i64
    };
    score.clamp(0, 100) as u8
}

/// Turn a correctly shaped raw score vector into a decision.
///
/// `confidence_threshold` gates fault reporting: a winner outside the issue
/// table or below the threshold is overridden to `"normal"` with no issues,
/// so low-confidence noise is never reported as a diagnosed fault.
pub fn decide_scores(raw_scores: &[f32], confidence_threshold: f64) -> Decision {
    debug_assert_eq!(raw_scores.len(), CLASSES.len());

    let probabilities = normalize_scores(raw_scores);

    // Winner by maximum normalized score. max_by is safe: the vector is
    // non-empty and normalization produced no NaN.
    let (winner_idx, &winner_prob) = probabilities
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .unwrap_or((0, &probabilities[0]));

    let raw_label = CLASSES[winner_idx];

    // Gate and score on the unrounded probability; rounding to wire
    // precision happens only when assembling the decision.
    let (label, issues) = match catalog::issue_for(raw_label) {
        Some(issue) if winner_prob >= confidence_threshold => {
            (raw_label, vec![issue.clone()])
        }
        _ => (NORMAL_CLASS, Vec::new()),
    };

    if label != raw_label {
        debug!(
            raw_label,
            confidence = winner_prob,
            "Confidence gate overrode prediction to normal"
        );
    }

    let class_probabilities: BTreeMap<String, f64> = CLASSES
        .iter()
        .zip(probabilities.iter())
        .map(|(&class, &p)| (class.to_string(), round_probability(p)))
        .collect();

    Decision {
        detected_class: label.to_string(),
        confidence: round_probability(winner_prob),
        class_probabilities,
        issues,
        overall_health: health_score(label == NORMAL_CLASS, winner_prob),
    }
}

/// Assemble the full diagnostic result for the client.
pub fn decide(
    raw_scores: &[f32],
    mode: AnalysisMode,
    confidence_threshold: f64,
    vibration_data: Vec<VibrationPoint>,
) -> DiagnosticResult {
    let decision = decide_scores(raw_scores, confidence_threshold);

    DiagnosticResult {
        overall_health: decision.overall_health,
        detected_class: decision.detected_class,
        confidence: decision.confidence,
        class_probabilities: decision.class_probabilities,
        issues: decision.issues,
        vibration_data,
        mode,
        timestamp: Utc::now(),
    }
}
