//! HTTP inference backend.
//!
//! Sends one sentence per request to an inference endpoint hosting the
//! pretrained model and expects a WAV body back.

use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use serde_json::json;
use tracing::debug;
use tts_core::{GenerationOptions, SpeechModel, TtsError, TtsResult, Voice};

/// Model served by a remote inference endpoint.
///
/// The HTTP client is built on the first request, which always runs on a
/// blocking thread. Requests have no timeout; a slow endpoint is waited on.
#[derive(Debug, Clone)]
pub struct RemoteModel {
    client: OnceCell<Client>,
    url: String,
    model_id: String,
    api_token: Option<String>,
    sample_rate: u32,
}

impl RemoteModel {
    /// Create a client for `<endpoint>/models/<model_id>`.
    pub fn new(
        endpoint: &str,
        model_id: impl Into<String>,
        api_token: Option<String>,
        sample_rate: u32,
    ) -> TtsResult<Self> {
        let model_id = model_id.into();
        if endpoint.trim().is_empty() {
            return Err(TtsError::config("inference endpoint must not be empty"));
        }

        Ok(Self {
            client: OnceCell::new(),
            url: format!("{}/models/{model_id}", endpoint.trim_end_matches('/')),
            model_id,
            api_token,
            sample_rate,
        })
    }

    /// Full URL requests are posted to.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn client(&self) -> TtsResult<&Client> {
        self.client.get_or_try_init(|| {
            Client::builder()
                .timeout(None::<Duration>)
                .build()
                .map_err(|e| TtsError::inference(format!("failed to build HTTP client: {e}")))
        })
    }
}

impl SpeechModel for RemoteModel {
    fn generate(
        &self,
        sentence: &str,
        voice: &Voice,
        options: &GenerationOptions,
    ) -> TtsResult<Vec<f32>> {
        let body = json!({
            "inputs": sentence,
            "parameters": {
                "voice_preset": voice.as_str(),
                "do_sample": options.do_sample,
                "temperature": options.temperature,
                "min_eos_p": options.min_eos_p,
                "max_length": options.max_length,
            }
        });

        let mut request = self.client()?.post(&self.url).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|e| TtsError::inference(format!("inference request failed: {e}")))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .map_err(|e| TtsError::inference(format!("failed to read inference response: {e}")))?;

        if !status.is_success() {
            return Err(TtsError::inference(format!(
                "inference endpoint returned {status}: {}",
                String::from_utf8_lossy(&bytes)
            )));
        }

        let audio = audio_writer::decode_wav(&bytes)?;
        if audio.sample_rate != self.sample_rate {
            return Err(TtsError::inference(format!(
                "endpoint returned {} Hz audio, expected {} Hz",
                audio.sample_rate, self.sample_rate
            )));
        }

        debug!(
            sentence_len = sentence.len(),
            samples = audio.samples.len(),
            channels = audio.channels,
            "Remote clip received"
        );

        Ok(downmix(audio.samples, audio.channels))
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn name(&self) -> &str {
        &self.model_id
    }
}

/// Average interleaved channels into mono.
fn downmix(samples: Vec<f32>, channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples;
    }
    let n = usize::from(channels);
    samples
        .chunks(n)
        .map(|frame| frame.iter().sum::<f32>() / n as f32)
        .collect()
}
