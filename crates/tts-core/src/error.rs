//! Unified error types for the text-to-audio service.

/// Main error type for text-to-audio operations.
#[derive(Debug, thiserror::Error)]
pub enum TtsError {
    /// Invalid input provided (e.g. neither text nor URL).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Fetching a URL failed, either at the network level or with a non-2xx status.
    #[error("fetch failed for {url}: {message}")]
    Fetch {
        url: String,
        status: Option<u16>,
        message: String,
    },

    /// Readable content could not be extracted from the document.
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// Text normalization failed.
    #[error("normalization failed: {0}")]
    Normalization(String),

    /// Model inference error.
    #[error("inference error: {0}")]
    Inference(String),

    /// Audio encoding or decoding error.
    #[error("audio encode error: {0}")]
    AudioEncode(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen in normal operation).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for Results with TtsError.
pub type TtsResult<T> = Result<T, TtsError>;

impl TtsError {
    /// Create an invalid input error with message.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a fetch error for a URL.
    pub fn fetch(url: impl Into<String>, status: Option<u16>, msg: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            status,
            message: msg.into(),
        }
    }

    /// Create an extraction error with message.
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }

    /// Create a normalization error with message.
    pub fn normalization(msg: impl Into<String>) -> Self {
        Self::Normalization(msg.into())
    }

    /// Create an inference error with message.
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    /// Create an audio encode error with message.
    pub fn audio_encode(msg: impl Into<String>) -> Self {
        Self::AudioEncode(msg.into())
    }

    /// Create a config error with message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error with message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the error was caused by the caller rather than the service.
    ///
    /// Extraction and normalization only fail when the input has nothing
    /// speakable in it.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::Extraction(_) | Self::Normalization(_)
        )
    }
}

impl From<serde_json::Error> for TtsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
