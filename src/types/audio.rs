//! Audio-domain types: analysis modes and decoded PCM buffers.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Analysis mode selected by the client.
///
/// Both modes run the full pipeline; they differ only in the vibration
/// visualization budget (100 vs 300 points). Any other value is rejected
/// before decoding begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    Quick,
    Deep,
}

impl AnalysisMode {
    /// Parse the raw form-field value. Only `"quick"` and `"deep"` are valid.
    pub fn parse(raw: &str) -> Result<Self, AnalysisError> {
        match raw {
            "quick" => Ok(Self::Quick),
            "deep" => Ok(Self::Deep),
            other => Err(AnalysisError::InvalidRequest(format!(
                "invalid mode '{other}' (expected 'quick' or 'deep')"
            ))),
        }
    }

    /// Number of vibration points emitted for this mode.
    pub const fn vibration_points(self) -> usize {
        match self {
            Self::Quick => crate::config::defaults::VIBRATION_POINTS_QUICK,
            Self::Deep => crate::config::defaults::VIBRATION_POINTS_DEEP,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Deep => "deep",
        }
    }
}

impl std::fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded mono PCM audio, exclusively owned by one pipeline invocation.
///
/// Invariant: `sample_rate > 0`. After [`crate::audio::normalize`] the buffer
/// holds exactly `target_duration_seconds * sample_rate` samples.
#[derive(Debug, Clone)]
pub struct PcmBuffer {
    /// Mono samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl PcmBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        debug_assert!(sample_rate > 0, "PcmBuffer requires a positive sample rate");
        Self {
            samples,
            sample_rate,
        }
    }

    /// Duration of the buffer in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse_valid() {
        assert_eq!(AnalysisMode::parse("quick").unwrap(), AnalysisMode::Quick);
        assert_eq!(AnalysisMode::parse("deep").unwrap(), AnalysisMode::Deep);
    }

    #[test]
    fn test_mode_parse_rejects_unknown() {
        assert!(AnalysisMode::parse("fast").is_err());
        assert!(AnalysisMode::parse("").is_err());
        assert!(AnalysisMode::parse("QUICK").is_err());
    }

    #[test]
    fn test_duration() {
        let buf = PcmBuffer::new(vec![0.0; 44_100], 44_100);
        assert!((buf.duration_seconds() - 1.0).abs() < 1e-9);
    }
}
