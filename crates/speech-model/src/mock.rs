//! Deterministic stand-in model.
//!
//! Produces a quiet enveloped tone whose length follows the sentence length
//! and whose pitch follows the voice preset. Useful for development, tests
//! and benchmarking the rest of the pipeline without model weights.

use std::f32::consts::PI;

use tts_core::{GenerationOptions, SpeechModel, TtsError, TtsResult, Voice};

/// Seconds of audio per input character.
const SECS_PER_CHAR: f32 = 0.06;
const MIN_SECS: f32 = 0.2;
const AMPLITUDE: f32 = 0.2;

/// Tone generator implementing [`SpeechModel`].
#[derive(Debug, Clone)]
pub struct MockModel {
    name: String,
    sample_rate: u32,
}

impl MockModel {
    /// Create a mock model reporting `name` and producing `sample_rate` audio.
    pub fn new(name: impl Into<String>, sample_rate: u32) -> Self {
        Self {
            name: name.into(),
            sample_rate,
        }
    }

    /// Number of samples generated for a sentence of `chars` characters.
    pub fn clip_len(&self, chars: usize) -> usize {
        let secs = (chars as f32 * SECS_PER_CHAR).max(MIN_SECS);
        (secs * self.sample_rate as f32) as usize
    }

    fn frequency(voice: &Voice) -> f32 {
        let seed: u32 = voice.as_str().bytes().map(u32::from).sum();
        180.0 + (seed % 8) as f32 * 20.0
    }
}

impl Default for MockModel {
    fn default() -> Self {
        Self::new("mock", 24000)
    }
}

impl SpeechModel for MockModel {
    fn generate(
        &self,
        sentence: &str,
        voice: &Voice,
        options: &GenerationOptions,
    ) -> TtsResult<Vec<f32>> {
        if sentence.trim().is_empty() {
            return Err(TtsError::inference("cannot synthesize an empty sentence"));
        }

        let chars = sentence.chars().count().min(options.max_length);
        let len = self.clip_len(chars);
        let freq = Self::frequency(voice);
        let sr = self.sample_rate as f32;

        // Short linear fade at both ends avoids clicks between clips.
        let fade = (len / 20).max(1) as f32;
        let samples = (0..len)
            .map(|i| {
                let t = i as f32 / sr;
                let edge = (i.min(len - 1 - i) as f32 / fade).min(1.0);
                (2.0 * PI * freq * t).sin() * AMPLITUDE * edge
            })
            .collect();

        Ok(samples)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn name(&self) -> &str {
        &self.name
    }
}
