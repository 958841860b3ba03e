//! Configuration structures for the text-to-audio service.
//!
//! Settings are layered: built-in defaults, then an optional file, then
//! environment variables prefixed with `TEXT2AUDIO__` (sections separated by
//! `__`, e.g. `TEXT2AUDIO__HUGGINGFACE__VOICE=v2/en_speaker_6`).

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{TtsError, TtsResult};
use crate::traits::GenerationOptions;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "TEXT2AUDIO";

/// Top-level settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Pretrained model selection.
    #[serde(default)]
    pub huggingface: HuggingFaceConfig,

    /// Model backend settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Fixed decoding parameters.
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Output directory settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Settings {
    /// Check cross-field constraints.
    pub fn validate(&self) -> TtsResult<()> {
        if self.huggingface.tts_model.trim().is_empty() {
            return Err(TtsError::config("huggingface.tts_model must not be empty"));
        }
        if self.huggingface.voice.trim().is_empty() {
            return Err(TtsError::config("huggingface.voice must not be empty"));
        }
        if self.huggingface.max_length == 0 {
            return Err(TtsError::config("huggingface.max_length must be positive"));
        }
        if self.model.sample_rate == 0 {
            return Err(TtsError::config("model.sample_rate must be positive"));
        }
        if self.model.backend == ModelBackend::Remote && self.model.endpoint.is_none() {
            return Err(TtsError::config("model.endpoint is required for the remote backend"));
        }
        if !(0.0..=1.0).contains(&self.synthesis.min_eos_p) {
            return Err(TtsError::config("synthesis.min_eos_p must be within [0, 1]"));
        }
        if self.synthesis.silence_secs < 0.0 {
            return Err(TtsError::config("synthesis.silence_secs must not be negative"));
        }
        Ok(())
    }

    /// Decoding options derived from these settings.
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions::new()
            .with_max_length(self.huggingface.max_length)
            .with_sampling(self.synthesis.do_sample)
            .with_temperature(self.synthesis.temperature)
            .with_min_eos_p(self.synthesis.min_eos_p)
    }
}

/// Load settings from an optional file and the environment.
///
/// Priority (highest to lowest):
/// 1. Environment variables (`TEXT2AUDIO__` prefix)
/// 2. The given config file
/// 3. Built-in defaults
pub fn load_settings(path: Option<&Path>) -> TtsResult<Settings> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
    );

    let settings: Settings = builder
        .build()
        .and_then(Config::try_deserialize)
        .map_err(|e| TtsError::config(e.to_string()))?;

    settings.validate()?;
    Ok(settings)
}

/// Pretrained model selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HuggingFaceConfig {
    /// Model identifier.
    #[serde(default = "default_tts_model")]
    pub tts_model: String,
    /// Default voice preset.
    #[serde(default = "default_voice")]
    pub voice: String,
    /// Maximum input length per synthesis chunk.
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

fn default_tts_model() -> String {
    "suno/bark".to_string()
}

fn default_voice() -> String {
    "v2/pt_speaker_0".to_string()
}

fn default_max_length() -> usize {
    5120
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            tts_model: default_tts_model(),
            voice: default_voice(),
            max_length: default_max_length(),
        }
    }
}

/// Which model implementation serves synthesis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelBackend {
    /// Deterministic tone generator (no weights needed).
    #[default]
    Mock,
    /// HTTP inference endpoint hosting the model.
    Remote,
}

/// Model backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Backend selection.
    #[serde(default)]
    pub backend: ModelBackend,
    /// Base URL of the inference endpoint (remote backend).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Bearer token for the inference endpoint.
    #[serde(default)]
    pub api_token: Option<String>,
    /// Output sample rate of the model in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

fn default_sample_rate() -> u32 {
    24000
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backend: ModelBackend::default(),
            endpoint: None,
            api_token: None,
            sample_rate: default_sample_rate(),
        }
    }
}

/// Fixed decoding parameters and inter-sentence silence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Enable sampling.
    #[serde(default = "default_do_sample")]
    pub do_sample: bool,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// End-of-sequence probability threshold.
    #[serde(default = "default_min_eos_p")]
    pub min_eos_p: f32,
    /// Silence appended after each sentence, in seconds.
    #[serde(default = "default_silence_secs")]
    pub silence_secs: f32,
}

fn default_do_sample() -> bool {
    true
}

fn default_temperature() -> f32 {
    0.6
}

fn default_min_eos_p() -> f32 {
    0.05
}

fn default_silence_secs() -> f32 {
    0.25
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            do_sample: default_do_sample(),
            temperature: default_temperature(),
            min_eos_p: default_min_eos_p(),
            silence_secs: default_silence_secs(),
        }
    }
}

/// Where generated audio is written and served from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory on disk.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    /// Public URL prefix the directory is served under.
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("static/audio")
}

fn default_public_prefix() -> String {
    "/static/audio".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            public_prefix: default_public_prefix(),
        }
    }
}

/// Server configuration (for tts-server).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address.
    #[serde(default = "default_server_host")]
    pub host: String,
    /// Server port.
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Request body size limit in bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8000
}

fn default_max_body_size() -> usize {
    2 * 1024 * 1024 // 2 MB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            max_body_size: default_max_body_size(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format (json or text).
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
