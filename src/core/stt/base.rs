use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;

/// An uploaded audio file as received from the caller.
#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub data: Bytes,
    pub file_name: String,
    /// MIME type reported by the client, if any
    pub content_type: Option<String>,
}

impl AudioUpload {
    pub fn new(data: impl Into<Bytes>, file_name: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            file_name: file_name.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum STTError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Provider error ({status}): {body}")]
    ProviderError { status: u16, body: String },

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

impl STTError {
    pub(crate) fn from_reqwest(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            STTError::Timeout(timeout)
        } else {
            STTError::NetworkError(error.to_string())
        }
    }
}

/// Batch speech-to-text over a single uploaded file.
#[async_trait]
pub trait BaseSTT: Send + Sync {
    /// Transcribe the upload and return the provider's text as-is.
    async fn transcribe(&self, audio: AudioUpload) -> Result<String, STTError>;

    fn provider_name(&self) -> &'static str;
}
