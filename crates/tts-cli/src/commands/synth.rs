//! Synthesis command implementation.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info};

use audio_writer::{read_wav, write_wav};
use runtime::{ProgressEvent, TextLoader, TtsPipeline};
use tts_core::{AudioBuffer, Settings};

use super::Source;

/// Result of a CLI synthesis run.
#[derive(Debug)]
pub struct SynthOutcome {
    /// Where the WAV file ended up.
    pub path: PathBuf,
    /// The synthesized audio.
    pub audio: AudioBuffer,
    /// Number of sentence clips.
    pub sentences: usize,
}

/// Run the synthesis command.
pub fn run(settings: &Settings, source: &Source, output: Option<&Path>) -> Result<()> {
    let start = Instant::now();
    let outcome = synthesize(settings, source, output)?;
    let total = start.elapsed();

    let audio_secs = outcome.audio.duration_ms() / 1000.0;
    let rtf = if audio_secs > 0.0 {
        total.as_secs_f32() / audio_secs
    } else {
        0.0
    };

    println!("Synthesis complete!");
    println!();
    println!("Output:      {}", outcome.path.display());
    println!("Sentences:   {}", outcome.sentences);
    println!();
    println!("Audio:");
    println!("  Duration:    {audio_secs:.2} sec");
    println!("  Samples:     {}", outcome.audio.num_frames());
    println!("  Sample rate: {} Hz", outcome.audio.sample_rate);
    println!();
    println!("Performance:");
    println!("  Total:       {} ms", total.as_millis());
    println!("  RTF:         {rtf:.3}x");

    info!(
        output = %outcome.path.display(),
        duration_ms = outcome.audio.duration_ms(),
        rtf,
        "Synthesis saved to file"
    );

    Ok(())
}

/// Synthesize a source. Without an explicit output the file is named and
/// placed by the pipeline's writer, exactly as the server does.
pub fn synthesize(
    settings: &Settings,
    source: &Source,
    output: Option<&Path>,
) -> Result<SynthOutcome> {
    let request = source.to_request()?;
    let pipeline = TtsPipeline::from_settings(settings).context("failed to build pipeline")?;

    info!(
        url = request.url(),
        voice = request.voice.as_deref().unwrap_or(pipeline.default_voice()),
        model = pipeline.model().name(),
        "Starting synthesis"
    );

    match output {
        Some(path) => {
            let document = TextLoader::new().load(&request)?;
            let text = pipeline
                .processor()
                .process(&document, request.voice_or(pipeline.default_voice()))?;

            let mut session = pipeline.synthesizer().session(&text.summary, &text.voice);
            let sentences = session.sentences().len();
            let mut audio = AudioBuffer::mono(pipeline.synthesizer().sample_rate());
            while let Some(clip) = session.next_clip()? {
                debug!(samples = clip.num_samples(), remaining = session.remaining(), "Clip");
                audio.extend_from_chunk(&clip);
            }

            write_wav(path, &audio)?;
            Ok(SynthOutcome {
                path: path.to_path_buf(),
                audio,
                sentences,
            })
        }
        None => {
            let mut sentences = 0;
            let response = pipeline.process(&request, |event| match &event {
                ProgressEvent::Started { content, .. } => {
                    debug!(content_len = content.len(), "Text ready");
                }
                ProgressEvent::Processing { time_taken, .. } => {
                    sentences += 1;
                    eprintln!("  sentence {sentences} done ({time_taken:.1}s)");
                }
                ProgressEvent::Done { .. } => {}
            })?;

            let file_name = response
                .audio_path
                .rsplit('/')
                .next()
                .unwrap_or(&response.audio_path);
            let path = pipeline.writer().dir().join(file_name);
            let audio = read_wav(&path)?;
            Ok(SynthOutcome {
                path,
                audio,
                sentences,
            })
        }
    }
}
