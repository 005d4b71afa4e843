//! Diagnosis: class catalog, decision engine, and vibration synthesis.
//!
//! - `catalog`: process-wide read-only class and issue tables
//! - `decision`: confidence-gated scoring (pure, total, deterministic)
//! - `vibration`: presentation-only synthetic vibration series

pub mod catalog;
pub mod decision;
pub mod vibration;

pub use catalog::{issue_for, issue_map, CLASSES, NORMAL_CLASS, NUM_CLASSES};
pub use decision::{decide, decide_scores, Decision};
pub use vibration::synthesize;
