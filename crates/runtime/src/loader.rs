//! Document loading: fetch a URL or pass raw text through.

use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use tracing::{info, instrument};
use tts_core::{InputRequest, TtsError, TtsResult};

/// Browser identity sent with every fetch. Some publishers serve a reduced
/// page or refuse requests without it.
pub const USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 13_5_1 like Mac OS X) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) Version/13.1.1 Mobile/15E148 Safari/604.1";

/// Loads the document a request refers to.
///
/// The blocking HTTP client is built on first fetch, so a loader can be
/// created inside an async context and used from a blocking one.
#[derive(Debug, Clone, Default)]
pub struct TextLoader {
    client: OnceCell<Client>,
}

impl TextLoader {
    /// Create a loader with the fixed browser User-Agent and no timeout.
    pub fn new() -> Self {
        Self::default()
    }

    fn client(&self) -> TtsResult<&Client> {
        self.client.get_or_try_init(|| {
            Client::builder()
                .user_agent(USER_AGENT)
                .timeout(None::<Duration>)
                .build()
                .map_err(|e| TtsError::internal(format!("failed to build HTTP client: {e}")))
        })
    }

    /// The document for a request: the fetched page when a URL is given,
    /// otherwise the raw text unchanged.
    pub fn load(&self, request: &InputRequest) -> TtsResult<String> {
        if let Some(url) = request.url() {
            return self.fetch(url);
        }
        request
            .raw_text()
            .map(str::to_string)
            .ok_or_else(|| TtsError::invalid_input("either raw_text or url must be provided"))
    }

    /// GET a URL and decode the body as UTF-8.
    #[instrument(skip(self))]
    pub fn fetch(&self, url: &str) -> TtsResult<String> {
        let response = self
            .client()?
            .get(url)
            .send()
            .map_err(|e| TtsError::fetch(url, None, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TtsError::fetch(
                url,
                Some(status.as_u16()),
                format!("upstream returned {status}"),
            ));
        }

        let bytes = response
            .bytes()
            .map_err(|e| TtsError::fetch(url, Some(status.as_u16()), e.to_string()))?;
        let body = String::from_utf8(bytes.to_vec()).map_err(|e| {
            TtsError::fetch(url, Some(status.as_u16()), format!("body is not UTF-8: {e}"))
        })?;

        info!(status = status.as_u16(), bytes = body.len(), "Document fetched");
        Ok(body)
    }
}
