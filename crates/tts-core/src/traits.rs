//! Trait definitions for pipeline components.

use crate::error::TtsResult;
use crate::types::Voice;

/// A pretrained text-to-audio model.
///
/// One instance is created at process start and shared read-only by every
/// request, so implementations must not need `&mut self` to generate.
pub trait SpeechModel: Send + Sync {
    /// Synthesize a single sentence.
    ///
    /// # Arguments
    /// * `sentence` - One sentence of normalized text
    /// * `voice` - Voice preset to imitate
    /// * `options` - Decoding parameters
    ///
    /// # Returns
    /// Mono float samples in [-1, 1] at [`SpeechModel::sample_rate`].
    fn generate(
        &self,
        sentence: &str,
        voice: &Voice,
        options: &GenerationOptions,
    ) -> TtsResult<Vec<f32>>;

    /// Output sample rate in Hz.
    fn sample_rate(&self) -> u32;

    /// Model identifier, for logs and `/info`.
    fn name(&self) -> &str;
}

/// Decoding options passed to the model for every sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    /// Maximum input length per synthesis chunk.
    pub max_length: usize,
    /// Enable sampling (otherwise greedy decoding).
    pub do_sample: bool,
    /// Temperature for sampling.
    pub temperature: f32,
    /// End-of-sequence probability threshold.
    pub min_eos_p: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_length: 5120,
            do_sample: true,
            temperature: 0.6,
            min_eos_p: 0.05,
        }
    }
}

impl GenerationOptions {
    /// Create new generation options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum input length.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Enable or disable sampling.
    pub fn with_sampling(mut self, do_sample: bool) -> Self {
        self.do_sample = do_sample;
        self
    }

    /// Set the temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the end-of-sequence probability threshold.
    pub fn with_min_eos_p(mut self, min_eos_p: f32) -> Self {
        self.min_eos_p = min_eos_p;
        self
    }
}
