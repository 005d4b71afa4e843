//! Feature Extractor: fixed-shape numeric representations of a PCM buffer.
//!
//! Two interchangeable strategies exist; exactly one is selected per
//! deployment (config-driven) and must stay shape-compatible with the
//! deployed model:
//!
//! - [`FeatureStrategy::Tabular`]: `(1, 104)` vector of MFCC statistics and
//!   spectral scalars, for dense models.
//! - [`FeatureStrategy::Image`]: `(1, 128, 128, 1)` z-scored MFCC image, for
//!   convolutional models.
//!
//! Extraction is a pure function of the PCM input: no hidden state, bit-
//! identical output for identical input, finite values even for silence.

pub mod dsp;
mod image;
mod tabular;

use serde::{Deserialize, Serialize};

use crate::config::defaults::N_FFT;
use crate::error::AnalysisError;
use crate::types::{FeatureTensor, PcmBuffer};

/// Which feature representation the deployed model expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureStrategy {
    /// Fixed-length statistic vector, `(1, 104)`.
    #[default]
    Tabular,
    /// Normalized MFCC image, `(1, 128, 128, 1)`.
    Image,
}

impl FeatureStrategy {
    /// The exact tensor shape this strategy produces.
    pub fn output_shape(self) -> Vec<usize> {
        use crate::config::defaults::{IMAGE_SIZE, TABULAR_FEATURE_LEN};
        match self {
            Self::Tabular => vec![1, TABULAR_FEATURE_LEN],
            Self::Image => vec![1, IMAGE_SIZE, IMAGE_SIZE, 1],
        }
    }
}

/// Extract the feature tensor for the configured strategy.
///
/// The normalizer guarantees the buffer spans the full analysis window, so a
/// buffer shorter than one FFT frame here is an internal invariant violation,
/// not a client error.
pub fn extract(pcm: &PcmBuffer, strategy: FeatureStrategy) -> Result<FeatureTensor, AnalysisError> {
    if pcm.len() < N_FFT {
        return Err(AnalysisError::FeatureExtraction(format!(
            "buffer of {} samples is shorter than one {N_FFT}-sample analysis frame; \
             normalizer padding contract violated",
            pcm.len()
        )));
    }

    let tensor = match strategy {
        FeatureStrategy::Tabular => tabular::extract(pcm),
        FeatureStrategy::Image => image::extract(pcm),
    };

    debug_assert_eq!(tensor.shape(), strategy.output_shape().as_slice());
    Ok(tensor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_buffer_is_invariant_violation() {
        let pcm = PcmBuffer::new(vec![0.0; 100], 8000);
        let result = extract(&pcm, FeatureStrategy::Tabular);
        match result {
            Err(AnalysisError::FeatureExtraction(_)) => {}
            other => panic!("expected FeatureExtraction error, got {other:?}"),
        }
    }

    #[test]
    fn test_strategies_produce_declared_shapes() {
        let pcm = PcmBuffer::new(vec![0.05; 24_000], 8000);
        for strategy in [FeatureStrategy::Tabular, FeatureStrategy::Image] {
            let tensor = extract(&pcm, strategy).unwrap();
            assert_eq!(tensor.shape(), strategy.output_shape().as_slice());
            assert!(tensor.is_finite());
        }
    }
}
