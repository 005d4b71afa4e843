//! AURIS - Acoustic Unit Rig Inspection System
//!
//! Machine-health diagnostics service: upload a short audio recording of
//! running equipment, get back a classified fault diagnosis with a health
//! score and chart-ready vibration data.
//!
//! # Usage
//!
//! ```bash
//! # Run with defaults (model at models/engine_classifier.json, port 8080)
//! cargo run --release
//!
//! # Override model and bind address
//! ./auris --model /opt/models/classifier.json --addr 0.0.0.0:9000
//! ```
//!
//! # Environment Variables
//!
//! - `AURIS_CONFIG`: Path to a TOML config file (default: ./auris.toml)
//! - `AURIS_CORS_ORIGINS`: Comma-separated allowed CORS origins
//! - `RUST_LOG`: Logging level (default: info)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use auris::api::{create_app, ApiState};
use auris::model::DenseModel;
use auris::pipeline::DiagnosticsEngine;
use auris::DiagnosticsConfig;

#[derive(Parser, Debug)]
#[command(name = "auris")]
#[command(about = "AURIS audio machine-diagnostics service")]
#[command(version)]
struct CliArgs {
    /// Override the server bind address (default: "0.0.0.0:8080")
    #[arg(short, long)]
    addr: Option<String>,

    /// Path to the classifier weights file
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Path to a TOML config file (overrides AURIS_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => DiagnosticsConfig::load_from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => DiagnosticsConfig::load(),
    };
    if let Some(addr) = args.addr {
        config.server.addr = addr;
    }

    let model_path = args
        .model
        .unwrap_or_else(|| PathBuf::from(auris::config::defaults::DEFAULT_MODEL_PATH));

    // Model load failure is fatal: the service must not come up without a
    // working classifier.
    info!(path = %model_path.display(), "Loading classifier model");
    let model = DenseModel::load(&model_path)
        .with_context(|| format!("failed to load model from {}", model_path.display()))?;

    let config = Arc::new(config);
    let engine = DiagnosticsEngine::new(Arc::new(model), Arc::clone(&config))
        .context("feature extractor and model are incompatible")?;

    let app = create_app(
        ApiState { engine },
        config.server.max_payload_bytes,
    );

    let listener = tokio::net::TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.addr))?;
    info!(addr = %config.server.addr, "AURIS listening");

    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Ctrl+C received, shutting down");
        shutdown_token.cancel();
    });

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
            info!("HTTP server received shutdown signal");
        })
        .await;

    match result {
        Ok(()) => {
            info!("Graceful shutdown complete");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "HTTP server error");
            Err(anyhow::anyhow!("HTTP server error: {e}"))
        }
    }
}
