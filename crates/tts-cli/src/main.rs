//! Text-to-audio command-line interface.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use runtime::logging::{LogFormat, init_logging};

mod commands;

/// Text-to-audio CLI
#[derive(Debug, Parser)]
#[command(name = "tts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// Log format (json or text)
    #[arg(long, default_value = "text", global = true)]
    log_format: LogFormatArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Json,
    Text,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Synthesize text or an article to audio
    Synth {
        #[command(flatten)]
        source: commands::Source,

        /// Output WAV path (defaults to a fresh file in the output directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract and normalize without synthesis (dry run)
    Normalize {
        #[command(flatten)]
        source: commands::Source,
    },

    /// Show version and configuration info
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = match cli.log_format {
        LogFormatArg::Json => LogFormat::Json,
        LogFormatArg::Text => LogFormat::Text,
    };
    init_logging(&cli.log_level, format);

    let settings =
        tts_core::load_settings(cli.config.as_deref()).context("failed to load settings")?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting text-to-audio CLI");

    match cli.command {
        Commands::Synth { source, output } => {
            commands::synth::run(&settings, &source, output.as_deref())
                .context("synthesis failed")?;
        }
        Commands::Normalize { source } => {
            commands::normalize::run(&settings, &source).context("normalization failed")?;
        }
        Commands::Info => {
            commands::info::run(&settings);
        }
    }

    Ok(())
}
