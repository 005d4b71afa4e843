//! Deployment configuration loaded from TOML.
//!
//! ## Loading order
//!
//! 1. `AURIS_CONFIG` environment variable (path to TOML file)
//! 2. `auris.toml` in the current working directory
//! 3. Built-in defaults from [`defaults`]
//!
//! Every field defaults to the matching constant in [`defaults`], so a
//! missing or partial config file changes nothing.

pub mod defaults;

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::features::FeatureStrategy;

/// Root configuration for a diagnostics deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Audio normalization settings.
    #[serde(default)]
    pub audio: AudioConfig,

    /// Feature extraction settings.
    #[serde(default)]
    pub features: FeatureConfig,

    /// Decision engine settings.
    #[serde(default)]
    pub decision: DecisionConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            audio: AudioConfig::default(),
            features: FeatureConfig::default(),
            decision: DecisionConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

/// Audio normalizer tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Fixed analysis window (seconds). Clips are padded/truncated to this.
    #[serde(default = "default_target_duration")]
    pub target_duration_seconds: f64,

    /// Path to the ffmpeg binary used for the transcode fallback.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,
}

fn default_target_duration() -> f64 {
    defaults::TARGET_DURATION_SECONDS
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            target_duration_seconds: default_target_duration(),
            ffmpeg_path: default_ffmpeg_path(),
        }
    }
}

/// Feature extraction tuning.
///
/// `strategy` picks the one canonical preprocessing path for the deployed
/// model; the other path stays dormant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Which feature representation the deployed model expects.
    #[serde(default)]
    pub strategy: FeatureStrategy,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            strategy: FeatureStrategy::default(),
        }
    }
}

/// Decision engine tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionConfig {
    /// Minimum confidence for a fault class to be reported.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
}

fn default_confidence_threshold() -> f64 {
    defaults::CONFIDENCE_THRESHOLD
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address, overridable via `--addr`.
    #[serde(default = "default_server_addr")]
    pub addr: String,

    /// Maximum accepted upload size in bytes.
    #[serde(default = "default_max_payload")]
    pub max_payload_bytes: usize,
}

fn default_server_addr() -> String {
    defaults::DEFAULT_SERVER_ADDR.to_string()
}

fn default_max_payload() -> usize {
    defaults::MAX_PAYLOAD_BYTES
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
            max_payload_bytes: default_max_payload(),
        }
    }
}

impl DiagnosticsConfig {
    /// Load configuration using the standard search order:
    /// 1. `$AURIS_CONFIG` environment variable
    /// 2. `./auris.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("AURIS_CONFIG") {
            if let Some(cfg) = Self::load_from_file(Path::new(&path)) {
                info!(path = %path, "Loaded config from AURIS_CONFIG");
                return cfg;
            }
            warn!(path = %path, "AURIS_CONFIG set but unreadable, falling back");
        }

        let local = Path::new("auris.toml");
        if local.exists() {
            if let Some(cfg) = Self::load_from_file(local) {
                info!("Loaded config from ./auris.toml");
                return cfg;
            }
            warn!("./auris.toml exists but could not be parsed, using defaults");
        }

        info!("No config file found, using built-in defaults");
        Self::default()
    }

    /// Load and parse a specific TOML file. Returns `None` on any I/O or
    /// parse failure (the caller decides whether that is fatal).
    pub fn load_from_file(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&contents) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to parse config file");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let cfg = DiagnosticsConfig::default();
        assert!((cfg.audio.target_duration_seconds - defaults::TARGET_DURATION_SECONDS).abs() < 1e-12);
        assert!((cfg.decision.confidence_threshold - defaults::CONFIDENCE_THRESHOLD).abs() < 1e-12);
        assert_eq!(cfg.server.max_payload_bytes, defaults::MAX_PAYLOAD_BYTES);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let cfg: DiagnosticsConfig = toml::from_str(
            r#"
            [decision]
            confidence_threshold = 0.75
            "#,
        )
        .unwrap();
        assert!((cfg.decision.confidence_threshold - 0.75).abs() < 1e-12);
        assert_eq!(cfg.server.addr, defaults::DEFAULT_SERVER_ADDR);
    }

    #[test]
    fn test_strategy_from_toml() {
        let cfg: DiagnosticsConfig = toml::from_str(
            r#"
            [features]
            strategy = "image"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.features.strategy, FeatureStrategy::Image);
    }
}
