//! Pipeline orchestration: bytes in, diagnostic result out.
//!
//! [`DiagnosticsEngine`] wires the normalizer, feature extractor, inference
//! adapter, decision engine, and vibration synthesizer together. It holds
//! the only process-wide state (the model and config) behind `Arc`, is
//! stateless across requests, and validates the model's output length at
//! the adapter boundary so version skew is caught before a malformed result
//! can reach a client.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::config::DiagnosticsConfig;
use crate::diagnosis::{self, NUM_CLASSES};
use crate::error::AnalysisError;
use crate::features::{self, FeatureStrategy};
use crate::model::Predictor;
use crate::types::{AnalysisMode, DiagnosticResult};

/// The full audio diagnostic inference pipeline.
///
/// Constructed once at startup with an explicitly injected predictor;
/// cheap to clone (everything shared is `Arc`ed) and safe for unbounded
/// concurrent use.
#[derive(Clone)]
pub struct DiagnosticsEngine {
    predictor: Arc<dyn Predictor>,
    strategy: FeatureStrategy,
    config: Arc<DiagnosticsConfig>,
}

impl DiagnosticsEngine {
    /// Build the engine, checking the extractor/model shape contract once
    /// up front instead of on the first request.
    pub fn new(
        predictor: Arc<dyn Predictor>,
        config: Arc<DiagnosticsConfig>,
    ) -> Result<Self, AnalysisError> {
        let strategy = config.features.strategy;

        let expected = predictor.expected_input_shape();
        let produced = strategy.output_shape();
        if expected != produced.as_slice() {
            return Err(AnalysisError::ShapeMismatch {
                expected: expected.to_vec(),
                actual: produced,
            });
        }

        if predictor.output_len() != NUM_CLASSES {
            return Err(AnalysisError::InvalidModelOutput {
                expected: NUM_CLASSES,
                actual: predictor.output_len(),
            });
        }

        info!(
            ?strategy,
            input_shape = ?expected,
            classes = NUM_CLASSES,
            "Diagnostics engine initialized"
        );

        Ok(Self {
            predictor,
            strategy,
            config,
        })
    }

    pub fn config(&self) -> &DiagnosticsConfig {
        &self.config
    }

    /// Run the full pipeline on one uploaded clip.
    ///
    /// Blocking (decode + DSP + inference) — callers on an async runtime
    /// should wrap this in `spawn_blocking`.
    #[instrument(skip(self, bytes), fields(bytes = bytes.len(), mode = %mode))]
    pub fn analyze(
        &self,
        bytes: Vec<u8>,
        content_type: Option<&str>,
        mode: AnalysisMode,
    ) -> Result<DiagnosticResult, AnalysisError> {
        if bytes.is_empty() {
            return Err(AnalysisError::InvalidRequest(
                "uploaded file is empty".to_string(),
            ));
        }

        let limit = self.config.server.max_payload_bytes;
        if bytes.len() > limit {
            return Err(AnalysisError::PayloadTooLarge {
                actual: bytes.len(),
                limit,
            });
        }

        let pcm = crate::audio::normalize(bytes, content_type, &self.config.audio)?;
        let features = features::extract(&pcm, self.strategy)?;

        let scores = self.predictor.predict(&features)?;
        if scores.len() != NUM_CLASSES {
            warn!(
                expected = NUM_CLASSES,
                actual = scores.len(),
                "Model emitted a score vector of the wrong length"
            );
            return Err(AnalysisError::InvalidModelOutput {
                expected: NUM_CLASSES,
                actual: scores.len(),
            });
        }

        // Vibration is presentation data only; its failure modes are fully
        // absorbed by the synthesizer's fallback.
        let vibration = diagnosis::synthesize(Some(&pcm), mode);

        let result = diagnosis::decide(
            &scores,
            mode,
            self.config.decision.confidence_threshold,
            vibration,
        );

        info!(
            detected_class = %result.detected_class,
            confidence = result.confidence,
            overall_health = result.overall_health,
            issues = result.issues.len(),
            "Analysis complete"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::TABULAR_FEATURE_LEN;
    use crate::model::testing::FixedPredictor;

    fn engine_with_scores(scores: Vec<f32>) -> Result<DiagnosticsEngine, AnalysisError> {
        DiagnosticsEngine::new(
            Arc::new(FixedPredictor {
                input_shape: vec![1, TABULAR_FEATURE_LEN],
                scores,
            }),
            Arc::new(DiagnosticsConfig::default()),
        )
    }

    #[test]
    fn test_engine_rejects_wrong_class_count() {
        let result = engine_with_scores(vec![0.5, 0.5]);
        assert!(matches!(
            result,
            Err(AnalysisError::InvalidModelOutput { .. })
        ));
    }

    #[test]
    fn test_engine_rejects_shape_mismatch() {
        let result = DiagnosticsEngine::new(
            Arc::new(FixedPredictor {
                input_shape: vec![1, 42],
                scores: vec![0.0; NUM_CLASSES],
            }),
            Arc::new(DiagnosticsConfig::default()),
        );
        assert!(matches!(result, Err(AnalysisError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_empty_upload_rejected_before_decode() {
        let engine = engine_with_scores(vec![0.9, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.1])
            .unwrap();
        let result = engine.analyze(Vec::new(), None, AnalysisMode::Quick);
        assert!(matches!(result, Err(AnalysisError::InvalidRequest(_))));
    }

    #[test]
    fn test_oversized_upload_rejected_before_decode() {
        let mut config = DiagnosticsConfig::default();
        config.server.max_payload_bytes = 8;
        let engine = DiagnosticsEngine::new(
            Arc::new(FixedPredictor {
                input_shape: vec![1, TABULAR_FEATURE_LEN],
                scores: vec![0.0; NUM_CLASSES],
            }),
            Arc::new(config),
        )
        .unwrap();

        let result = engine.analyze(vec![0u8; 16], None, AnalysisMode::Quick);
        assert!(matches!(result, Err(AnalysisError::PayloadTooLarge { .. })));
    }
}
