//! Text-to-audio HTTP server.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use runtime::logging::init_logging_from_config;
use runtime::{TtsMetrics, TtsPipeline};
use tts_core::Settings;
use tts_server::{ServerConfig, TtsServer};

/// Text-to-audio HTTP server
#[derive(Debug, Parser)]
#[command(name = "tts-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind host (overrides the configuration)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides the configuration)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (overrides the configuration)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    /// Let command-line flags win over the loaded settings.
    fn apply_to(&self, settings: &mut Settings) {
        if let Some(host) = &self.host {
            settings.server.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(level) = &self.log_level {
            settings.logging.level = level.clone();
        }
        if self.json_logs {
            settings.logging.format = "json".to_string();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings =
        tts_core::load_settings(args.config.as_deref()).context("Failed to load settings")?;
    args.apply_to(&mut settings);
    init_logging_from_config(&settings.logging).context("Invalid logging settings")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        model = %settings.huggingface.tts_model,
        backend = ?settings.model.backend,
        "Starting text-to-audio server"
    );

    let metrics = TtsMetrics::install().context("Failed to install metrics recorder")?;
    let pipeline = TtsPipeline::from_settings(&settings).context("Failed to create pipeline")?;
    let config = ServerConfig::from_settings(&settings.server)?;

    TtsServer::new(config, pipeline, Some(metrics))
        .run()
        .await
        .context("Server failed")?;

    info!("Server shutdown complete");
    Ok(())
}
