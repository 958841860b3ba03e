//! Router tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use mockito::Server;
use runtime::TtsPipeline;
use serde_json::{Value, json};
use speech_model::MockModel;
use tempfile::TempDir;
use tower::ServiceExt;
use tts_core::{GenerationOptions, Settings, SpeechModel, TtsError, TtsResult, Voice};
use tts_server::{AppState, router};

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

fn app_with(model: Arc<dyn SpeechModel>) -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = Settings::default();
    settings.output.dir = dir.path().to_path_buf();

    let pipeline = TtsPipeline::new(model, &settings).unwrap();
    let state = Arc::new(AppState::new(pipeline, None));
    (router(state, settings.server.max_body_size), dir)
}

fn app() -> (Router, TempDir) {
    app_with(Arc::new(MockModel::new("mock", 24000)))
}

fn accept_event_stream(mut request: Request<Body>) -> Request<Body> {
    request
        .headers_mut()
        .insert(header::ACCEPT, "text/event-stream".parse().unwrap());
    request
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Parse the `data:` payloads of an SSE body.
async fn sse_events(response: axum::response::Response) -> Vec<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec())
        .unwrap()
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| serde_json::from_str(data.trim()).unwrap())
        .collect()
}

#[tokio::test]
async fn test_index_page() {
    let (app, _dir) = app();
    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("/synthesize/stream"));
}

#[tokio::test]
async fn test_synthesize_json_and_serve_audio() {
    let (app, dir) = app();

    let response = app
        .clone()
        .oneshot(post_json("/synthesize", json!({ "raw_text": "Hello world." })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["content"], "Hello world.<br>");
    assert!(body["time_taken"].as_f64().unwrap() >= 0.0);

    let audio_path = body["audio_path"].as_str().unwrap().to_string();
    assert!(audio_path.starts_with("/static/audio/synthesized-"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

    let response = app
        .oneshot(Request::get(&audio_path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[0..4], b"RIFF");
}

#[tokio::test]
async fn test_synthesize_event_stream() {
    let (app, _dir) = app();

    let request = accept_event_stream(post_json(
        "/synthesize",
        json!({ "raw_text": "Primeira frase. Segunda frase.", "voice": "v2/pt_speaker_0" }),
    ));

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
    assert_eq!(response.headers()["x-accel-buffering"], "no");

    let events = sse_events(response).await;
    let statuses: Vec<&str> = events
        .iter()
        .map(|e| e["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, ["started", "processing", "processing", "done"]);

    assert_eq!(events[1]["sample_rate"], 24000);
    assert!(!events[1]["audio_data"].as_array().unwrap().is_empty());
    assert_eq!(events[3]["audio_data"].as_array().unwrap().len(), 6000);
    assert!(
        events[3]["audio"]
            .as_str()
            .unwrap()
            .starts_with("/static/audio/")
    );
}

#[tokio::test]
async fn test_stream_route_is_always_sse() {
    let (app, _dir) = app();

    let response = app
        .oneshot(post_json("/synthesize/stream", json!({ "raw_text": "Oi." })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let events = sse_events(response).await;
    assert_eq!(events.first().unwrap()["status"], "started");
    assert_eq!(events.last().unwrap()["status"], "done");
}

#[tokio::test]
async fn test_missing_input_is_bad_request() {
    let (app, dir) = app();

    for uri in ["/synthesize", "/synthesize/stream"] {
        let response = app
            .clone()
            .oneshot(post_json(uri, json!({ "voice": "v2/en_speaker_6" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .contains("either raw_text or url must be provided")
        );
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let (app, _dir) = app();

    let request = Request::builder()
        .method("POST")
        .uri("/synthesize")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_fetch_failure_is_bad_gateway() {
    let mut upstream = Server::new_async().await;
    upstream
        .mock("GET", "/article")
        .with_status(404)
        .create_async()
        .await;
    let url = format!("{}/article", upstream.url());

    let (app, dir) = app();

    let response = app
        .clone()
        .oneshot(post_json("/synthesize", json!({ "url": url })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("404"));

    // Fetching happens before `started`, so streaming requests fail the same way.
    for request in [
        accept_event_stream(post_json("/synthesize", json!({ "url": url }))),
        post_json("/synthesize/stream", json!({ "url": url })),
    ] {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(body_json(response).await["error"].as_str().unwrap().contains("404"));
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_nothing_to_speak_is_bad_request() {
    let (app, dir) = app();

    for request in [
        post_json("/synthesize", json!({ "raw_text": "()" })),
        post_json("/synthesize/stream", json!({ "raw_text": "()" })),
    ] {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_model_failure_ends_open_stream() {
    let (app, dir) = app_with(Arc::new(BrokenModel));

    let response = app
        .clone()
        .oneshot(post_json("/synthesize/stream", json!({ "raw_text": "Um. Dois." })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let events = sse_events(response).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["status"], "started");

    let response = app
        .oneshot(post_json("/synthesize", json!({ "raw_text": "Um. Dois." })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_health_info_metrics() {
    let (app, _dir) = app();

    for uri in ["/health", "/healthz"] {
        let response = app
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");
    }

    let response = app
        .clone()
        .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(Request::get("/info").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let info = body_json(response).await;
    assert_eq!(info["model"], "mock");
    assert_eq!(info["sample_rate"], 24000);
    assert_eq!(info["default_voice"], "v2/pt_speaker_0");
    assert_eq!(info["audio_format"], "audio/wav");

    let response = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain")
    );
}
