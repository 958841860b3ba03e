//! Request orchestration: load, extract and normalize, synthesize, write.

use std::sync::Arc;
use std::time::Instant;

use audio_writer::AudioWriter;
use serde::{Deserialize, Serialize};
use text_normalizer::TextProcessor;
use tokio::sync::mpsc;
use tokio_stream::{StreamExt, wrappers::ReceiverStream};
use tracing::{info, instrument, warn};
use tts_core::{AudioBuffer, InputRequest, Settings, SpeechModel, TtsError, TtsResult};

use crate::loader::TextLoader;
use crate::metrics::TtsMetrics;
use crate::synthesizer::Synthesizer;

/// Events buffered between the worker and the response before the worker
/// waits.
const EVENT_BUFFER: usize = 16;

/// Progress of one request, in emission order: one `Started`, one
/// `Processing` per sentence, one `Done`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProgressEvent {
    /// Text is ready; synthesis is about to begin.
    Started {
        /// Seconds since the request started.
        time_taken: f64,
        /// Display form of the text.
        content: String,
    },
    /// One sentence was synthesized.
    Processing {
        time_taken: f64,
        /// Clip samples, including the trailing silence.
        audio_data: Vec<f32>,
        sample_rate: u32,
    },
    /// The audio file was written.
    Done {
        time_taken: f64,
        /// Trailing silence.
        audio_data: Vec<f32>,
        sample_rate: u32,
        /// Public path of the written file.
        audio: String,
        content: String,
    },
}

impl ProgressEvent {
    /// Seconds since the request started.
    pub fn time_taken(&self) -> f64 {
        match self {
            Self::Started { time_taken, .. }
            | Self::Processing { time_taken, .. }
            | Self::Done { time_taken, .. } => *time_taken,
        }
    }

    /// Whether this is the final event of a successful request.
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done { .. })
    }
}

/// Result of a non-streaming request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesizeResponse {
    /// Seconds the request took.
    pub time_taken: f64,
    /// Display form of the text.
    pub content: String,
    /// Public path of the written file.
    pub audio_path: String,
}

/// Stream of progress events. An `Err` item is always the last one.
pub type ProgressStream = ReceiverStream<TtsResult<ProgressEvent>>;

struct Inner {
    loader: TextLoader,
    processor: TextProcessor,
    synthesizer: Synthesizer,
    writer: AudioWriter,
    default_voice: String,
    metrics: TtsMetrics,
}

/// Text-to-audio pipeline shared by all requests.
///
/// Cloning is cheap; clones share the model handle.
#[derive(Clone)]
pub struct TtsPipeline {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for TtsPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtsPipeline")
            .field("synthesizer", &self.inner.synthesizer)
            .field("writer", &self.inner.writer)
            .field("default_voice", &self.inner.default_voice)
            .finish()
    }
}

impl TtsPipeline {
    /// Create a pipeline around an already loaded model.
    pub fn new(model: Arc<dyn SpeechModel>, settings: &Settings) -> TtsResult<Self> {
        info!(
            model = model.name(),
            voice = %settings.huggingface.voice,
            output_dir = %settings.output.dir.display(),
            "Creating TTS pipeline"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                loader: TextLoader::new(),
                processor: TextProcessor::new(),
                synthesizer: Synthesizer::new(
                    model,
                    settings.generation_options(),
                    settings.synthesis.silence_secs,
                ),
                writer: AudioWriter::from_config(&settings.output),
                default_voice: settings.huggingface.voice.clone(),
                metrics: TtsMetrics,
            }),
        })
    }

    /// Load the configured model backend and create a pipeline around it.
    pub fn from_settings(settings: &Settings) -> TtsResult<Self> {
        let model = speech_model::load_model(settings)?;
        Self::new(model, settings)
    }

    /// The shared model handle.
    pub fn model(&self) -> &Arc<dyn SpeechModel> {
        self.inner.synthesizer.model()
    }

    /// Voice used when a request names none.
    pub fn default_voice(&self) -> &str {
        &self.inner.default_voice
    }

    /// Output writer.
    pub fn writer(&self) -> &AudioWriter {
        &self.inner.writer
    }

    /// Text processor.
    pub fn processor(&self) -> &TextProcessor {
        &self.inner.processor
    }

    /// Synthesizer.
    pub fn synthesizer(&self) -> &Synthesizer {
        &self.inner.synthesizer
    }

    /// Start a request on the blocking pool and stream its progress.
    ///
    /// Invalid requests fail here, before any work is scheduled. The worker
    /// runs to completion even if the stream is dropped.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime. Use [`TtsPipeline::process`]
    /// from synchronous code.
    pub fn start(&self, request: InputRequest) -> TtsResult<ProgressStream> {
        let metrics = self.inner.metrics;
        metrics.request_received();
        if let Err(e) = request.validate() {
            metrics.request_failed();
            return Err(e);
        }

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let inner = Arc::clone(&self.inner);

        tokio::task::spawn_blocking(move || {
            let result = inner.run(&request, &mut |event| {
                // A closed channel means the client left; keep going.
                let _ = tx.blocking_send(Ok(event));
            });
            if let Err(e) = result {
                let _ = tx.blocking_send(Err(e));
            }
        });

        Ok(ReceiverStream::new(rx))
    }

    /// Run a request to completion and return its summary.
    pub async fn synthesize(&self, request: InputRequest) -> TtsResult<SynthesizeResponse> {
        let mut stream = self.start(request)?;
        let mut content = None;

        while let Some(event) = stream.next().await {
            match event? {
                ProgressEvent::Started { content: c, .. } => content = Some(c),
                ProgressEvent::Processing { .. } => {}
                ProgressEvent::Done {
                    time_taken, audio, ..
                } => {
                    return Ok(SynthesizeResponse {
                        time_taken,
                        content: content.unwrap_or_default(),
                        audio_path: audio,
                    });
                }
            }
        }

        Err(TtsError::internal("pipeline ended without producing audio"))
    }

    /// Run a request on the current thread, reporting each event to
    /// `on_event`.
    pub fn process(
        &self,
        request: &InputRequest,
        mut on_event: impl FnMut(ProgressEvent),
    ) -> TtsResult<SynthesizeResponse> {
        let metrics = self.inner.metrics;
        metrics.request_received();
        if let Err(e) = request.validate() {
            metrics.request_failed();
            return Err(e);
        }
        self.inner.run(request, &mut on_event)
    }
}

impl Inner {
    fn run(
        &self,
        request: &InputRequest,
        emit: &mut dyn FnMut(ProgressEvent),
    ) -> TtsResult<SynthesizeResponse> {
        self.metrics.request_started();
        let started = Instant::now();
        let result = self.run_stages(request, started, emit);
        self.metrics.request_finished();

        match &result {
            Ok(response) => {
                self.metrics.request_completed();
                self.metrics
                    .record_total_latency(started.elapsed().as_secs_f64() * 1000.0);
                info!(
                    audio_path = %response.audio_path,
                    time_taken = response.time_taken,
                    "Request completed"
                );
            }
            Err(e) => {
                self.metrics.request_failed();
                warn!(error = %e, "Request failed");
            }
        }
        result
    }

    #[instrument(skip_all, fields(url = request.url(), voice = request.voice.as_deref()))]
    fn run_stages(
        &self,
        request: &InputRequest,
        started: Instant,
        emit: &mut dyn FnMut(ProgressEvent),
    ) -> TtsResult<SynthesizeResponse> {
        let elapsed = || started.elapsed().as_secs_f64();

        request.validate()?;
        let voice = request.voice_or(&self.default_voice);
        let document = self.loader.load(request)?;
        let text = self.processor.process(&document, voice)?;

        emit(ProgressEvent::Started {
            time_taken: elapsed(),
            content: text.content.clone(),
        });

        let sample_rate = self.synthesizer.sample_rate();
        let mut session = self.synthesizer.session(&text.summary, &text.voice);
        let mut buffer = AudioBuffer::mono(sample_rate);

        while let Some(clip) = session.next_clip()? {
            buffer.extend_from_chunk(&clip);
            emit(ProgressEvent::Processing {
                time_taken: elapsed(),
                audio_data: clip.pcm.to_vec(),
                sample_rate,
            });
        }

        let written = self.writer.write(&buffer)?;
        let time_taken = elapsed();

        emit(ProgressEvent::Done {
            time_taken,
            audio_data: self.synthesizer.silence(),
            sample_rate,
            audio: written.public_path.clone(),
            content: text.content.clone(),
        });

        Ok(SynthesizeResponse {
            time_taken,
            content: text.content,
            audio_path: written.public_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use speech_model::MockModel;
    use tempfile::TempDir;

    fn pipeline() -> (TtsPipeline, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.output.dir = dir.path().to_path_buf();
        let model = Arc::new(MockModel::new("mock", 24000));
        (TtsPipeline::new(model, &settings).unwrap(), dir)
    }

    #[test]
    fn test_event_serialization() {
        let event = ProgressEvent::Started {
            time_taken: 0.5,
            content: "Olá.<br>".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({ "status": "started", "time_taken": 0.5, "content": "Olá.<br>" })
        );

        let event = ProgressEvent::Done {
            time_taken: 1.0,
            audio_data: vec![0.0],
            sample_rate: 24000,
            audio: "/static/audio/x.wav".to_string(),
            content: "c".to_string(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["status"], "done");
        assert_eq!(value["audio"], "/static/audio/x.wav");
        assert_eq!(value["sample_rate"], 24000);
    }

    #[test]
    fn test_process_event_order() {
        let (pipeline, _dir) = pipeline();
        let mut events = Vec::new();

        let response = pipeline
            .process(
                &InputRequest::from_text("First sentence. Second sentence."),
                |e| events.push(e),
            )
            .unwrap();

        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], ProgressEvent::Started { .. }));
        assert!(matches!(events[1], ProgressEvent::Processing { .. }));
        assert!(matches!(events[2], ProgressEvent::Processing { .. }));
        assert!(events[3].is_done());

        let times: Vec<f64> = events.iter().map(ProgressEvent::time_taken).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
        assert!(response.audio_path.starts_with("/static/audio/synthesized-"));
    }

    #[test]
    fn test_process_rejects_empty_request() {
        let (pipeline, dir) = pipeline();
        let mut called = false;
        let result = pipeline.process(&InputRequest::default(), |_| called = true);

        assert!(matches!(result, Err(TtsError::InvalidInput(_))));
        assert!(!called);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_synthesize_writes_file() {
        let (pipeline, dir) = pipeline();
        let response = pipeline
            .synthesize(InputRequest::from_text("Hello world."))
            .await
            .unwrap();

        assert_eq!(response.content, "Hello world.<br>");
        let name = response.audio_path.rsplit('/').next().unwrap();
        assert!(dir.path().join(name).exists());
    }

    #[tokio::test]
    async fn test_start_rejects_before_spawning() {
        let (pipeline, _dir) = pipeline();
        let result = pipeline.start(InputRequest::from_text("   "));
        assert!(matches!(result, Err(TtsError::InvalidInput(_))));
    }

    #[test]
    #[should_panic]
    fn test_start_needs_runtime() {
        let (pipeline, _dir) = pipeline();
        let _ = pipeline.start(InputRequest::from_text("Oi."));
    }
}
