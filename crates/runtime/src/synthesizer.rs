//! Sentence-by-sentence synthesis.

use std::sync::Arc;

use text_normalizer::split_sentences;
use tracing::{debug, instrument};
use tts_core::{AudioBuffer, AudioChunk, GenerationOptions, Lang, SpeechModel, TtsResult, Voice};

use crate::metrics::TtsMetrics;

/// Drives the model over the sentences of a normalized text.
#[derive(Clone)]
pub struct Synthesizer {
    model: Arc<dyn SpeechModel>,
    options: GenerationOptions,
    silence_secs: f32,
}

impl std::fmt::Debug for Synthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synthesizer")
            .field("model", &self.model.name())
            .field("options", &self.options)
            .field("silence_secs", &self.silence_secs)
            .finish()
    }
}

impl Synthesizer {
    /// Create a synthesizer over a shared model handle.
    pub fn new(model: Arc<dyn SpeechModel>, options: GenerationOptions, silence_secs: f32) -> Self {
        Self {
            model,
            options,
            silence_secs,
        }
    }

    /// The model handle.
    pub fn model(&self) -> &Arc<dyn SpeechModel> {
        &self.model
    }

    /// Output sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.model.sample_rate()
    }

    /// The silence appended after every sentence.
    pub fn silence(&self) -> Vec<f32> {
        audio_writer::silence(self.sample_rate(), self.silence_secs)
    }

    /// Sentences of a text with line breaks flattened.
    pub fn sentences(text: &str, lang: Lang) -> Vec<String> {
        split_sentences(text.replace('\n', " ").trim(), lang)
    }

    /// Start a lazy session over `summary`.
    pub fn session(&self, summary: &str, voice: &Voice) -> SynthesisSession<'_> {
        SynthesisSession {
            synthesizer: self,
            voice: voice.clone(),
            sentences: Self::sentences(summary, voice.lang()),
            position: 0,
            elapsed_ms: 0.0,
        }
    }

    /// Synthesize every sentence and concatenate the clips.
    #[instrument(skip(self, summary), fields(summary_len = summary.len(), voice = %voice))]
    pub fn synthesize(&self, summary: &str, voice: &Voice) -> TtsResult<AudioBuffer> {
        let mut session = self.session(summary, voice);
        let mut buffer = AudioBuffer::mono(self.sample_rate());
        while let Some(clip) = session.next_clip()? {
            buffer.extend_from_chunk(&clip);
        }
        Ok(buffer)
    }
}

/// Per-request iteration over sentence clips.
pub struct SynthesisSession<'a> {
    synthesizer: &'a Synthesizer,
    voice: Voice,
    sentences: Vec<String>,
    position: usize,
    elapsed_ms: f32,
}

impl SynthesisSession<'_> {
    /// Synthesize the next sentence, followed by the inter-sentence silence.
    pub fn next_clip(&mut self) -> TtsResult<Option<AudioChunk>> {
        let Some(sentence) = self.sentences.get(self.position) else {
            return Ok(None);
        };

        let synth = self.synthesizer;
        let mut pcm = synth.model.generate(sentence, &self.voice, &synth.options)?;
        pcm.extend(synth.silence());

        let sample_rate = synth.sample_rate();
        let start_ms = self.elapsed_ms;
        self.elapsed_ms += pcm.len() as f32 * 1000.0 / sample_rate.max(1) as f32;
        self.position += 1;
        TtsMetrics.sentence_synthesized();

        debug!(
            sentence = self.position,
            total = self.sentences.len(),
            samples = pcm.len(),
            "Sentence synthesized"
        );

        Ok(Some(AudioChunk::new(pcm, sample_rate, start_ms, self.elapsed_ms)))
    }

    /// The sentences this session will synthesize.
    pub fn sentences(&self) -> &[String] {
        &self.sentences
    }

    /// Number of sentences not yet synthesized.
    pub fn remaining(&self) -> usize {
        self.sentences.len() - self.position
    }

    /// Whether every sentence has been synthesized.
    pub fn is_finished(&self) -> bool {
        self.position >= self.sentences.len()
    }
}

impl std::fmt::Debug for SynthesisSession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesisSession")
            .field("voice", &self.voice)
            .field("sentences", &self.sentences.len())
            .field("position", &self.position)
            .finish()
    }
}
