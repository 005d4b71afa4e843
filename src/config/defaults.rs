//! System-wide default constants.
//!
//! Centralises the pipeline's magic numbers. Grouped by subsystem for easy
//! discovery. Values that operators may tune per deployment also appear as
//! fields of [`crate::config::DiagnosticsConfig`]; these are the fallbacks.

// ============================================================================
// Audio Normalizer
// ============================================================================

/// Fixed analysis window the normalizer pads/truncates to (seconds).
///
/// Shorter clips get trailing silence; longer clips keep only the leading
/// window.
pub const TARGET_DURATION_SECONDS: f64 = 3.0;

// ============================================================================
// Feature Extractor
// ============================================================================

/// MFCC coefficients for the tabular strategy.
pub const TABULAR_N_MFCC: usize = 40;

/// MFCC coefficients (= image side) for the image strategy.
pub const IMAGE_SIZE: usize = 128;

/// FFT window size for MFCC framing (samples).
pub const N_FFT: usize = 2048;

/// Hop length between analysis frames (samples).
pub const HOP_LENGTH: usize = 512;

/// Number of mel bands in the filterbank.
pub const N_MELS: usize = 128;

/// Chroma bins (semitones per octave).
pub const N_CHROMA: usize = 12;

/// Spectral contrast bands (6 octave bands + 1 sub-band).
pub const N_CONTRAST: usize = 7;

/// Roll-off percentage for the spectral rolloff scalar.
pub const ROLLOFF_PERCENT: f32 = 0.85;

/// Epsilon guarding z-score normalization against silent/constant input.
pub const NORM_EPSILON: f32 = 1e-6;

/// Tabular feature vector length:
/// 40 MFCC means + 40 MFCC stds + centroid mean/std + rolloff mean +
/// bandwidth mean + ZCR mean + 12 chroma means + 7 contrast means.
pub const TABULAR_FEATURE_LEN: usize = TABULAR_N_MFCC * 2 + 5 + N_CHROMA + N_CONTRAST;

// ============================================================================
// Decision Engine
// ============================================================================

/// Minimum confidence for a fault class to be reported as an issue.
/// Below this the result is overridden to "normal" with no issues.
pub const CONFIDENCE_THRESHOLD: f64 = 0.60;

/// Probability floor applied before renormalization.
pub const SCORE_EPSILON: f64 = 1e-6;

/// Health score floor for fault results — a single clip never implies
/// total failure.
pub const MIN_FAULT_HEALTH: u8 = 30;

/// Decimal places for confidence and per-class probabilities on the wire.
pub const PROBABILITY_DECIMALS: u32 = 4;

// ============================================================================
// Vibration Synthesizer
// ============================================================================

/// Vibration points for quick mode.
pub const VIBRATION_POINTS_QUICK: usize = 100;

/// Vibration points for deep mode.
pub const VIBRATION_POINTS_DEEP: usize = 300;

/// STFT frame size for the spectral vibration path (samples).
pub const VIBRATION_FRAME_SIZE: usize = 1024;

// ============================================================================
// HTTP Boundary
// ============================================================================

/// Maximum accepted payload size (bytes). 50 MiB.
pub const MAX_PAYLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Default HTTP bind address.
pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:8080";

/// Default model weight file path.
pub const DEFAULT_MODEL_PATH: &str = "models/engine_classifier.json";
