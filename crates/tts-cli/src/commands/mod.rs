//! CLI command implementations.

pub mod info;
pub mod normalize;
pub mod synth;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;
use tts_core::InputRequest;

/// Where the text comes from.
#[derive(Debug, Clone, Default, Args)]
pub struct Source {
    /// Input text, or @file.txt to read it from a file
    #[arg(required_unless_present = "url")]
    pub input: Option<String>,

    /// Article URL to fetch instead of text
    #[arg(short, long)]
    pub url: Option<String>,

    /// Voice preset (defaults to the configured voice)
    #[arg(short, long)]
    pub voice: Option<String>,
}

impl Source {
    /// Resolve `@file` input and build the request.
    pub fn to_request(&self) -> Result<InputRequest> {
        let raw_text = match self.input.as_deref() {
            Some(input) => match input.strip_prefix('@') {
                Some(path) => {
                    info!(path, "Reading text from file");
                    Some(
                        std::fs::read_to_string(path)
                            .with_context(|| format!("failed to read {path}"))?,
                    )
                }
                None => Some(input.to_string()),
            },
            None => None,
        };

        let request = InputRequest {
            raw_text,
            url: self.url.clone(),
            voice: self.voice.clone(),
        };
        request.validate()?;
        Ok(request)
    }
}
