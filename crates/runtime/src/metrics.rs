//! Metrics collection and Prometheus export.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tts_core::{TtsError, TtsResult};

/// Metrics recorder for text-to-audio requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TtsMetrics;

impl TtsMetrics {
    /// Install the global Prometheus recorder.
    ///
    /// The returned handle renders the text exposition format; the server
    /// serves it at `/metrics`.
    pub fn install() -> TtsResult<PrometheusHandle> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| TtsError::internal(format!("metrics init failed: {e}")))?;

        Self::register_metrics();
        Ok(handle)
    }

    fn register_metrics() {
        describe_counter!(
            "tts_requests_total",
            "Total number of synthesis requests received"
        );
        describe_counter!(
            "tts_requests_completed",
            "Total number of synthesis requests completed successfully"
        );
        describe_counter!(
            "tts_requests_failed",
            "Total number of synthesis requests that failed"
        );
        describe_counter!(
            "tts_sentences_synthesized",
            "Total number of sentences passed through the model"
        );
        describe_histogram!(
            "tts_total_latency_ms",
            "Total request latency in milliseconds"
        );
        describe_gauge!("tts_active_requests", "Number of currently active requests");
    }

    /// Record a new request received.
    pub fn request_received(&self) {
        counter!("tts_requests_total").increment(1);
    }

    /// Record a request completed successfully.
    pub fn request_completed(&self) {
        counter!("tts_requests_completed").increment(1);
    }

    /// Record a request failed.
    pub fn request_failed(&self) {
        counter!("tts_requests_failed").increment(1);
    }

    /// Record one sentence synthesized.
    pub fn sentence_synthesized(&self) {
        counter!("tts_sentences_synthesized").increment(1);
    }

    /// Record total latency.
    pub fn record_total_latency(&self, ms: f64) {
        histogram!("tts_total_latency_ms").record(ms);
    }

    /// A request started running.
    pub fn request_started(&self) {
        gauge!("tts_active_requests").increment(1.0);
    }

    /// A request stopped running.
    pub fn request_finished(&self) {
        gauge!("tts_active_requests").decrement(1.0);
    }
}
