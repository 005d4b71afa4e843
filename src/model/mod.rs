//! Inference Adapter: the trained classifier as a narrow capability.
//!
//! The rest of the pipeline only ever sees [`Predictor`] — an opaque
//! `predict(features) -> scores` function plus its declared input shape.
//! One concrete adapter exists per model runtime; swapping runtimes means
//! implementing this trait, nothing else changes.
//!
//! The model is loaded once at startup (load failure is fatal — the process
//! must not serve requests with no model) and shared read-only across all
//! concurrent requests.

mod dense;

pub use dense::DenseModel;

use crate::error::AnalysisError;
use crate::types::FeatureTensor;

/// Opaque trained classifier.
///
/// Implementations are immutable after construction and safe for unbounded
/// concurrent use without locking.
pub trait Predictor: Send + Sync {
    /// The exact tensor shape `predict` accepts.
    fn expected_input_shape(&self) -> &[usize];

    /// Number of scores `predict` emits (must equal the class catalog size).
    fn output_len(&self) -> usize;

    /// Run inference. Fails with a shape-mismatch error if the tensor does
    /// not exactly match [`Self::expected_input_shape`] — never reshapes.
    fn predict(&self, features: &FeatureTensor) -> Result<Vec<f32>, AnalysisError>;
}

/// Validate the feature tensor against the predictor's declared shape.
/// Shared guard for all adapter implementations.
pub(crate) fn check_input_shape(
    expected: &[usize],
    features: &FeatureTensor,
) -> Result<(), AnalysisError> {
    if features.shape() != expected {
        return Err(AnalysisError::ShapeMismatch {
            expected: expected.to_vec(),
            actual: features.shape().to_vec(),
        });
    }
    Ok(())
}

pub mod testing {
    //! Substitute predictors for unit and integration tests.

    use super::{check_input_shape, Predictor};
    use crate::error::AnalysisError;
    use crate::types::FeatureTensor;

    /// Returns a fixed score vector regardless of input.
    pub struct FixedPredictor {
        pub input_shape: Vec<usize>,
        pub scores: Vec<f32>,
    }

    impl Predictor for FixedPredictor {
        fn expected_input_shape(&self) -> &[usize] {
            &self.input_shape
        }

        fn output_len(&self) -> usize {
            self.scores.len()
        }

        fn predict(&self, features: &FeatureTensor) -> Result<Vec<f32>, AnalysisError> {
            check_input_shape(&self.input_shape, features)?;
            Ok(self.scores.clone())
        }
    }
}
