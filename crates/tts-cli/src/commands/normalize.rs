//! Normalize command implementation.

use anyhow::Result;

use runtime::{Synthesizer, TextLoader};
use text_normalizer::TextProcessor;
use tts_core::{ProcessedText, Settings};

use super::Source;

/// Run the normalize command: everything up to synthesis.
pub fn run(settings: &Settings, source: &Source) -> Result<()> {
    let text = process(settings, source)?;
    let sentences = Synthesizer::sentences(&text.summary, text.voice.lang());

    println!("Voice:    {} ({})", text.voice, text.voice.lang());
    println!("Content:  {}", text.content);
    println!("Summary:  {}", text.summary);
    println!("Sentences:");
    for (i, sentence) in sentences.iter().enumerate() {
        println!("  [{}] {sentence}", i + 1);
    }

    Ok(())
}

/// Load and normalize a source.
pub fn process(settings: &Settings, source: &Source) -> Result<ProcessedText> {
    let request = source.to_request()?;
    let document = TextLoader::new().load(&request)?;
    let voice = request.voice_or(&settings.huggingface.voice);
    Ok(TextProcessor::new().process(&document, voice)?)
}
