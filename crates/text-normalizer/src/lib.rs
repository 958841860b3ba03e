//! # text-normalizer
//!
//! Turns fetched documents into speakable text.
//!
//! This crate provides:
//! - Readability-style extraction of the main content from HTML (`extract`)
//! - An ordered rule pipeline that makes text speech-friendly (`Normalizer`)
//! - Language-aware sentence splitting (`split_sentences`)
//!
//! # Example
//!
//! ```ignore
//! use text_normalizer::TextProcessor;
//! use tts_core::Voice;
//!
//! let processor = TextProcessor::new();
//! let text = processor.process("50% disseram 'olá'.", Voice::from("v2/pt_speaker_0"))?;
//! assert_eq!(text.summary, "50 porcento disseram olá.");
//! ```

pub mod extract;
mod rules;
mod sentences;

use tracing::instrument;
use tts_core::{Lang, ProcessedText, TtsError, TtsResult, Voice};

pub use extract::{Extracted, NO_TITLE_SENTINEL, extract};
pub use rules::{PARAGRAPH_MARKER, ParagraphMarkRule, Rule};
pub use sentences::split_sentences;

/// Speech normalizer with an ordered rule pipeline.
#[derive(Debug)]
pub struct Normalizer {
    rules: Vec<Box<dyn Rule>>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    /// Create a new normalizer with the default speech rules.
    pub fn new() -> Self {
        Self {
            rules: rules::default_rules(),
        }
    }

    /// Names of the rules, in application order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Apply every rule in sequence.
    #[instrument(skip(self, input), fields(input_len = input.len()))]
    pub fn normalize(&self, input: &str, lang: Lang) -> TtsResult<String> {
        let mut text = input.to_string();
        for rule in &self.rules {
            if rule.applies_to(lang) {
                text = rule.apply(&text, lang)?;
            }
        }
        Ok(text)
    }

    /// Display form of already-normalized text.
    pub fn display(&self, summary: &str, lang: Lang) -> TtsResult<String> {
        ParagraphMarkRule.apply(summary, lang)
    }
}

/// Extraction plus normalization: raw document in, [`ProcessedText`] out.
#[derive(Debug, Default)]
pub struct TextProcessor {
    normalizer: Normalizer,
}

impl TextProcessor {
    /// Create a processor with the default normalizer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract, title and normalize a document for a voice.
    #[instrument(skip(self, document), fields(document_len = document.len(), voice = %voice))]
    pub fn process(&self, document: &str, voice: Voice) -> TtsResult<ProcessedText> {
        let lang = voice.lang();
        let extracted = extract(document)?;
        let summary = self.normalizer.normalize(&extracted.titled_text(), lang)?;
        if summary.trim().is_empty() {
            return Err(TtsError::normalization("nothing left to speak after normalization"));
        }
        let content = self.normalizer.display(&summary, lang)?;

        Ok(ProcessedText {
            content,
            summary,
            voice,
        })
    }
}
