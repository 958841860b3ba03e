//! Integration tests for the text-to-audio runtime.
//!
//! These tests run whole requests through the pipeline with a mock model and
//! a temporary output directory.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use mockito::Server;
use runtime::{ProgressEvent, TtsPipeline};
use speech_model::MockModel;
use tempfile::TempDir;
use tokio_stream::StreamExt;
use tts_core::{
    GenerationOptions, InputRequest, Settings, SpeechModel, TtsError, TtsResult, Voice,
};

/// Mock model that counts how often it is asked to generate.
#[derive(Debug, Default)]
struct CountingModel {
    inner: MockModel,
    calls: AtomicUsize,
}

impl SpeechModel for CountingModel {
    fn generate(
        &self,
        sentence: &str,
        voice: &Voice,
        options: &GenerationOptions,
    ) -> TtsResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.generate(sentence, voice, options)
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn name(&self) -> &str {
        "counting"
    }
}

/// Model whose every call fails.
#[derive(Debug)]
struct BrokenModel;

impl SpeechModel for BrokenModel {
    fn generate(&self, _: &str, _: &Voice, _: &GenerationOptions) -> TtsResult<Vec<f32>> {
        Err(TtsError::inference("weights missing"))
    }

    fn sample_rate(&self) -> u32 {
        24000
    }

    fn name(&self) -> &str {
        "broken"
    }
}

fn setup(model: Arc<dyn SpeechModel>) -> (TtsPipeline, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = Settings::default();
    settings.output.dir = dir.path().to_path_buf();
    (TtsPipeline::new(model, &settings).unwrap(), dir)
}

fn files_in(dir: &TempDir) -> usize {
    std::fs::read_dir(dir.path()).map_or(0, |entries| entries.count())
}

async fn collect(pipeline: &TtsPipeline, request: InputRequest) -> Vec<TtsResult<ProgressEvent>> {
    pipeline.start(request).unwrap().collect().await
}

/// "Hello world." with the default voice: one sentence, one file.
#[tokio::test]
async fn test_hello_world_end_to_end() {
    let model = Arc::new(CountingModel::default());
    let (pipeline, dir) = setup(model.clone());

    let events: Vec<ProgressEvent> = collect(&pipeline, InputRequest::from_text("Hello world."))
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();

    assert_eq!(events.len(), 3);
    assert_eq!(model.calls.load(Ordering::SeqCst), 1);

    let ProgressEvent::Started { content, .. } = &events[0] else {
        panic!("expected started, got {:?}", events[0]);
    };
    assert_eq!(content, "Hello world.<br>");

    let ProgressEvent::Processing {
        audio_data: clip,
        sample_rate,
        ..
    } = &events[1]
    else {
        panic!("expected processing, got {:?}", events[1]);
    };
    assert_eq!(*sample_rate, 24000);

    let ProgressEvent::Done {
        audio,
        audio_data: silence,
        ..
    } = &events[2]
    else {
        panic!("expected done, got {:?}", events[2]);
    };
    assert_eq!(silence.len(), 6000);
    assert!(silence.iter().all(|&s| s == 0.0));

    let name = audio.strip_prefix("/static/audio/").unwrap();
    assert!(name.starts_with("synthesized-") && name.ends_with(".wav"));

    let written = audio_writer::read_wav(dir.path().join(name)).unwrap();
    assert_eq!(written.sample_rate, 24000);
    assert_eq!(written.samples.len(), clip.len());
}

/// The same text with two voices lands in two distinct files.
#[tokio::test]
async fn test_distinct_files_per_voice() {
    let (pipeline, dir) = setup(Arc::new(MockModel::default()));

    let pt = pipeline
        .synthesize(InputRequest::from_text("Olá mundo.").with_voice("v2/pt_speaker_0"))
        .await
        .unwrap();
    let en = pipeline
        .synthesize(InputRequest::from_text("Olá mundo.").with_voice("v2/en_speaker_6"))
        .await
        .unwrap();

    assert_ne!(pt.audio_path, en.audio_path);
    assert_eq!(files_in(&dir), 2);
}

/// Requests without text or URL never reach the model.
#[tokio::test]
async fn test_validation_short_circuits() {
    let model = Arc::new(CountingModel::default());
    let (pipeline, dir) = setup(model.clone());

    for request in [
        InputRequest::default(),
        InputRequest::from_text("  \n "),
        InputRequest::from_url(""),
    ] {
        assert!(matches!(
            pipeline.start(request.clone()),
            Err(TtsError::InvalidInput(_))
        ));
        assert!(matches!(
            pipeline.synthesize(request).await,
            Err(TtsError::InvalidInput(_))
        ));
    }

    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    assert_eq!(files_in(&dir), 0);
}

/// A model failure ends the stream without `done` and writes nothing.
#[tokio::test]
async fn test_model_failure_ends_stream() {
    let (pipeline, dir) = setup(Arc::new(BrokenModel));

    let events = collect(&pipeline, InputRequest::from_text("One. Two.")).await;

    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], Ok(ProgressEvent::Started { .. })));
    assert!(matches!(events[1], Err(TtsError::Inference(_))));
    assert_eq!(files_in(&dir), 0);
}

/// Articles are fetched, extracted and titled before synthesis.
#[tokio::test]
async fn test_url_request() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/noticia")
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(
            "<html><head><title>Economia (hoje)</title></head><body>\
             <nav><a href=\"/\">Início</a></nav>\
             <article><p>A inflação caiu 2% no trimestre, segundo o instituto.</p>\
             <p>O Sr. Souza comentou o resultado. Analistas concordaram.</p></article>\
             </body></html>",
        )
        .create_async()
        .await;

    let model = Arc::new(CountingModel::default());
    let (pipeline, _dir) = setup(model.clone());

    let response = pipeline
        .synthesize(
            InputRequest::from_url(format!("{}/noticia", server.url()))
                .with_voice("v2/pt_speaker_0"),
        )
        .await
        .unwrap();

    assert!(response.content.starts_with("Economia hoje: A inflação caiu 2 porcento"));
    assert!(!response.content.contains("Início"));
    assert_eq!(model.calls.load(Ordering::SeqCst), 3);
}

/// Upstream errors surface as fetch errors with the status.
#[tokio::test]
async fn test_url_fetch_failure() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/gone")
        .with_status(410)
        .create_async()
        .await;

    let model = Arc::new(CountingModel::default());
    let (pipeline, dir) = setup(model.clone());

    let err = pipeline
        .synthesize(InputRequest::from_url(format!("{}/gone", server.url())))
        .await
        .unwrap_err();

    assert!(matches!(err, TtsError::Fetch { status: Some(410), .. }));
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    assert_eq!(files_in(&dir), 0);
}

/// Dropping the stream does not cancel the request.
#[tokio::test]
async fn test_dropped_stream_still_writes_file() {
    let (pipeline, dir) = setup(Arc::new(MockModel::default()));

    let stream = pipeline
        .start(InputRequest::from_text("Nobody is listening. Still done."))
        .unwrap();
    drop(stream);

    for _ in 0..100 {
        if files_in(&dir) == 1 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert_eq!(files_in(&dir), 1);
}

/// The blocking entry point produces the same sequence as the stream.
#[test]
fn test_process_matches_stream_shape() {
    let (pipeline, _dir) = setup(Arc::new(MockModel::default()));
    let mut statuses = Vec::new();

    pipeline
        .process(&InputRequest::from_text("Um. Dois. Três."), |event| {
            statuses.push(serde_json::to_value(&event).unwrap()["status"].clone());
        })
        .unwrap();

    assert_eq!(
        statuses,
        ["started", "processing", "processing", "processing", "done"]
    );
}
