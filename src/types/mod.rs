//! Core value objects shared across the diagnostics pipeline.
//!
//! All types here are request-scoped: created for a single analysis,
//! returned to the caller, and dropped. The only process-wide state in the
//! system is the loaded model and the static class/issue tables in
//! [`crate::diagnosis::catalog`].

mod audio;
mod diagnosis;

pub use audio::{AnalysisMode, PcmBuffer};
pub use diagnosis::{DiagnosticResult, FeatureTensor, Issue, Severity, VibrationPoint};
