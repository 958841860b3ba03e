//! Core data types for the text-to-audio pipeline.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{TtsError, TtsResult};

/// Languages the sentence splitter and normalizer know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    /// English (fallback for every voice that is not Portuguese).
    #[default]
    En,
    /// Portuguese.
    Pt,
}

impl Lang {
    /// Derive the language from a voice preset identifier.
    ///
    /// Presets look like `v2/pt_speaker_0`: an optional namespace, then a
    /// language code before the first underscore.
    pub fn from_voice(voice: &str) -> Self {
        let name = voice.rsplit('/').next().unwrap_or(voice);
        let code = name.split('_').next().unwrap_or_default();
        if code.eq_ignore_ascii_case("pt") {
            Lang::Pt
        } else {
            Lang::En
        }
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lang::En => write!(f, "en"),
            Lang::Pt => write!(f, "pt"),
        }
    }
}

impl std::str::FromStr for Lang {
    type Err = TtsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Ok(Lang::En),
            "pt" | "portuguese" => Ok(Lang::Pt),
            _ => Err(TtsError::invalid_input(format!("unknown language: {s}"))),
        }
    }
}

/// A voice preset identifier selecting the speaker style and language.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Voice(String);

impl Voice {
    /// Create a voice from a preset identifier.
    pub fn new(preset: impl Into<String>) -> Self {
        Self(preset.into())
    }

    /// The raw preset identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Language implied by this voice.
    pub fn lang(&self) -> Lang {
        Lang::from_voice(&self.0)
    }
}

impl std::fmt::Display for Voice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Voice {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A synthesis request as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRequest {
    /// Literal text to read.
    #[serde(default)]
    pub raw_text: Option<String>,
    /// Article URL to fetch and read.
    #[serde(default)]
    pub url: Option<String>,
    /// Voice preset; the configured default applies when absent.
    #[serde(default)]
    pub voice: Option<String>,
}

impl InputRequest {
    /// Create a request for literal text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            raw_text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Create a request for an article URL.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Set the voice preset.
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    /// Non-blank URL, if any.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    /// Non-blank raw text, if any.
    pub fn raw_text(&self) -> Option<&str> {
        self.raw_text
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }

    /// Reject requests that carry neither text nor URL.
    pub fn validate(&self) -> TtsResult<()> {
        if self.raw_text().is_none() && self.url().is_none() {
            return Err(TtsError::invalid_input(
                "either raw_text or url must be provided",
            ));
        }
        Ok(())
    }

    /// Resolve the voice against a default preset.
    pub fn voice_or(&self, default: &str) -> Voice {
        match self.voice.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => Voice::new(v),
            _ => Voice::new(default),
        }
    }
}

/// Text ready for synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedText {
    /// Display form, with paragraph markers after sentence-ending lines.
    pub content: String,
    /// Speech-normalized form fed to the synthesizer.
    pub summary: String,
    /// Voice preset to synthesize with.
    pub voice: Voice,
}

/// A chunk of synthesized audio (one sentence clip).
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// PCM samples (f32, mono).
    pub pcm: Arc<[f32]>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Start time in milliseconds.
    pub start_ms: f32,
    /// End time in milliseconds.
    pub end_ms: f32,
}

impl AudioChunk {
    /// Create a new audio chunk.
    pub fn new(pcm: Vec<f32>, sample_rate: u32, start_ms: f32, end_ms: f32) -> Self {
        Self {
            pcm: pcm.into(),
            sample_rate,
            start_ms,
            end_ms,
        }
    }

    /// Get the duration of this chunk in milliseconds.
    pub fn duration_ms(&self) -> f32 {
        self.end_ms - self.start_ms
    }

    /// Get the number of samples in this chunk.
    pub fn num_samples(&self) -> usize {
        self.pcm.len()
    }
}

/// A complete waveform for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Interleaved float samples in [-1, 1].
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of interleaved channels.
    pub channels: u16,
}

impl AudioBuffer {
    /// Create an empty mono buffer.
    pub fn mono(sample_rate: u32) -> Self {
        Self {
            samples: Vec::new(),
            sample_rate,
            channels: 1,
        }
    }

    /// Append a clip to the end of the buffer.
    pub fn extend_from_chunk(&mut self, chunk: &AudioChunk) {
        self.samples.extend_from_slice(&chunk.pcm);
    }

    /// Number of frames (samples per channel).
    pub fn num_frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }

    /// Duration in milliseconds.
    pub fn duration_ms(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.num_frames() as f32 * 1000.0 / self.sample_rate as f32
    }

    /// Whether the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
