//! HTTP handlers for the text-to-audio service.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{
        Html, IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use serde::Serialize;
use serde_json::json;
use tokio_stream::{Stream, StreamExt};
use tracing::{info, instrument, warn};

use runtime::{ProgressEvent, ProgressStream, SynthesizeResponse};
use tts_core::{InputRequest, TtsError, TtsResult};

use crate::server::AppState;

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// A [`TtsError`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub TtsError);

impl From<TtsError> for ApiError {
    fn from(err: TtsError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// HTTP status for the wrapped error.
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            TtsError::Fetch { .. } => StatusCode::BAD_GATEWAY,
            err if err.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self.0, status = status.as_u16(), "Request failed");
        } else {
            info!(error = %self.0, status = status.as_u16(), "Request rejected");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Whether the client asked for server-sent events.
fn wants_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/event-stream"))
}

/// Wait for the first event of a request and turn the rest into an SSE
/// response.
///
/// Loading and text processing happen before `started`, so their failures
/// are returned as an error status. Failures after that end the stream
/// without a `done` event.
async fn open_event_stream(mut progress: ProgressStream) -> Result<Response, ApiError> {
    let first = match progress.next().await {
        Some(Ok(event)) => event,
        Some(Err(e)) => return Err(e.into()),
        None => {
            return Err(TtsError::internal("request ended before synthesis started").into());
        }
    };
    Ok(event_stream(tokio_stream::once(Ok(first)).chain(progress)))
}

/// Turn a progress stream into an SSE response. An error item ends the
/// stream.
fn event_stream<S>(progress: S) -> Response
where
    S: Stream<Item = TtsResult<ProgressEvent>> + Send + 'static,
{
    let events = progress.map_while(|item| match item {
        Ok(event) => match Event::default().json_data(&event) {
            Ok(sse) => Some(Ok::<_, Infallible>(sse)),
            Err(e) => {
                warn!(error = %e, "Failed to serialize progress event");
                None
            }
        },
        Err(e) => {
            warn!(error = %e, "Synthesis failed mid-stream");
            None
        }
    });

    let mut response = Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response();
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert("x-accel-buffering", HeaderValue::from_static("no"));
    response
}

/// `GET /`
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// `POST /synthesize`: JSON by default, SSE when the client accepts
/// `text/event-stream`.
#[instrument(skip_all, fields(url = request.url(), voice = request.voice.as_deref()))]
pub async fn synthesize(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<InputRequest>,
) -> Result<Response, ApiError> {
    if wants_event_stream(&headers) {
        return open_event_stream(state.pipeline.start(request)?).await;
    }

    let response: SynthesizeResponse = state.pipeline.synthesize(request).await?;
    Ok(Json(response).into_response())
}

/// `POST /synthesize/stream`: always SSE.
#[instrument(skip_all, fields(url = request.url(), voice = request.voice.as_deref()))]
pub async fn synthesize_stream(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InputRequest>,
) -> Result<Response, ApiError> {
    open_event_stream(state.pipeline.start(request)?).await
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: u64,
}

/// `GET /health`
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// `GET /ready`
pub async fn ready() -> impl IntoResponse {
    StatusCode::OK
}

/// Info response.
#[derive(Serialize)]
struct InfoResponse {
    name: &'static str,
    version: &'static str,
    model: String,
    sample_rate: u32,
    default_voice: String,
    audio_prefix: String,
    audio_format: &'static str,
}

/// `GET /info`
pub async fn info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let pipeline = &state.pipeline;
    Json(InfoResponse {
        name: "text2audio",
        version: env!("CARGO_PKG_VERSION"),
        model: pipeline.model().name().to_string(),
        sample_rate: pipeline.model().sample_rate(),
        default_voice: pipeline.default_voice().to_string(),
        audio_prefix: pipeline.writer().public_prefix().to_string(),
        audio_format: pipeline.writer().format().mime_type(),
    })
}

/// `GET /metrics` (Prometheus text format).
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}
