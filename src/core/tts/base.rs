use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use thiserror::Error;

/// Chunked audio body as it arrives from the provider.
pub type AudioStream = Pin<Box<dyn Stream<Item = Result<Bytes, TTSError>> + Send>>;

/// A synthesis result whose headers are known but whose body is still streaming.
pub struct SynthesizedAudio {
    /// Content type reported by the provider, if any.
    pub content_type: Option<String>,
    pub stream: AudioStream,
}

impl std::fmt::Debug for SynthesizedAudio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesizedAudio")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error)]
pub enum TTSError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Provider error ({status}): {body}")]
    ProviderError { status: u16, body: String },

    #[error("Audio stream error: {0}")]
    StreamError(String),
}

/// Streaming text-to-speech.
///
/// `synthesize` resolves once the provider has accepted the request and sent
/// its response headers; audio bytes are pulled from the returned stream.
#[async_trait]
pub trait BaseTTS: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, TTSError>;

    fn provider_name(&self) -> &'static str;
}
