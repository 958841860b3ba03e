//! Output directory management and file naming.

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;
use tts_core::{AudioBuffer, TtsError, TtsResult, config::OutputConfig};
use uuid::Uuid;

use crate::wav;

/// Prefix of every generated file name.
pub const FILE_PREFIX: &str = "synthesized";

/// Container format of generated files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AudioFormat {
    /// Uncompressed 16-bit PCM WAV.
    #[default]
    Wav,
}

impl AudioFormat {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
        }
    }

    /// MIME type served for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "audio/wav",
        }
    }
}

/// A file written by [`AudioWriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenAudio {
    /// Location on disk.
    pub path: PathBuf,
    /// URL path the file is served under.
    pub public_path: String,
}

/// Writes request waveforms into the output directory.
#[derive(Debug, Clone)]
pub struct AudioWriter {
    dir: PathBuf,
    public_prefix: String,
    format: AudioFormat,
}

impl AudioWriter {
    /// Create a writer for a directory served under `public_prefix`.
    pub fn new(dir: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            public_prefix: public_prefix.into(),
            format: AudioFormat::default(),
        }
    }

    /// Create a writer from output settings.
    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(config.dir.clone(), config.public_prefix.clone())
    }

    /// Output directory on disk.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Public URL prefix.
    pub fn public_prefix(&self) -> &str {
        &self.public_prefix
    }

    /// Container format.
    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// A fresh `synthesized-<uuid-hex>-<timestamp>.<ext>` file name.
    pub fn file_name(&self) -> String {
        format!(
            "{FILE_PREFIX}-{}-{}.{}",
            Uuid::new_v4().simple(),
            Local::now().format("%Y%m%d%H%M%S"),
            self.format.extension()
        )
    }

    /// Write a buffer under a fresh name and return where it landed.
    pub fn write(&self, buffer: &AudioBuffer) -> TtsResult<WrittenAudio> {
        if buffer.is_empty() {
            return Err(TtsError::audio_encode("refusing to write empty audio"));
        }

        std::fs::create_dir_all(&self.dir)?;

        let file_name = self.file_name();
        let path = self.dir.join(&file_name);
        match self.format {
            AudioFormat::Wav => wav::write_wav(&path, buffer)?,
        }

        let public_path = format!("{}/{file_name}", self.public_prefix.trim_end_matches('/'));

        info!(
            path = %path.display(),
            public_path = %public_path,
            duration_ms = buffer.duration_ms(),
            "Audio written"
        );

        Ok(WrittenAudio { path, public_path })
    }
}
