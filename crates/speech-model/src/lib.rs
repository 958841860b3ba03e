//! # speech-model
//!
//! Backends for the pretrained text-to-audio model.
//!
//! The model is loaded once per process and shared by every request as an
//! `Arc<dyn SpeechModel>`. Two backends are provided:
//! - [`MockModel`]: deterministic tone generator, no weights required
//! - [`RemoteModel`]: an HTTP inference endpoint hosting the model
//!
//! # Example
//!
//! ```ignore
//! use speech_model::load_model;
//! use tts_core::{Settings, Voice};
//!
//! let settings = Settings::default();
//! let model = load_model(&settings)?;
//! let samples = model.generate("Olá.", &Voice::from("v2/pt_speaker_0"), &settings.generation_options())?;
//! ```

pub mod mock;
pub mod remote;

use std::sync::Arc;

use tracing::info;
use tts_core::{Settings, SpeechModel, TtsError, TtsResult, config::ModelBackend};

pub use mock::MockModel;
pub use remote::RemoteModel;

/// Build the model backend selected in `settings`.
pub fn load_model(settings: &Settings) -> TtsResult<Arc<dyn SpeechModel>> {
    let model_id = settings.huggingface.tts_model.as_str();
    let sample_rate = settings.model.sample_rate;

    let model: Arc<dyn SpeechModel> = match settings.model.backend {
        ModelBackend::Mock => Arc::new(MockModel::new(format!("mock:{model_id}"), sample_rate)),
        ModelBackend::Remote => {
            let endpoint = settings
                .model
                .endpoint
                .as_deref()
                .ok_or_else(|| TtsError::config("model.endpoint is required for the remote backend"))?;
            Arc::new(RemoteModel::new(
                endpoint,
                model_id,
                settings.model.api_token.clone(),
                sample_rate,
            )?)
        }
    };

    info!(
        backend = ?settings.model.backend,
        model = model.name(),
        sample_rate,
        "Speech model loaded"
    );
    Ok(model)
}
