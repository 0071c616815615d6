//! Gladia transcription client.
//!
//! Uploads one audio file as multipart form data and reads the `text` field of
//! the JSON reply.
//!
//! # API Reference
//!
//! - Endpoint: `POST https://api.gladia.io/v2/upload`
//! - Auth: `x-gladia-key` header
//! - Request: multipart, file under the `audio` field
//! - Response: JSON object with a `text` string

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, warn};

use super::base::{AudioUpload, BaseSTT, STTError};

/// Gladia upload endpoint
pub const GLADIA_STT_URL: &str = "https://api.gladia.io/v2/upload";

/// Header carrying the Gladia API key
pub const GLADIA_KEY_HEADER: &str = "x-gladia-key";

/// Multipart field holding the audio file
const AUDIO_FIELD: &str = "audio";

const DEFAULT_AUDIO_MIME: &str = "application/octet-stream";

#[derive(Debug, Deserialize)]
struct GladiaTranscriptionResponse {
    text: Option<String>,
}

/// Gladia settings resolved from the server configuration.
#[derive(Clone)]
pub struct GladiaSTTConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

/// Gladia STT client implementing [`BaseSTT`].
pub struct GladiaSTT {
    config: GladiaSTTConfig,
    http_client: Client,
}

impl GladiaSTT {
    pub fn new(http_client: Client, config: GladiaSTTConfig) -> Self {
        Self {
            config,
            http_client,
        }
    }

    fn build_form(audio: AudioUpload) -> Result<Form, STTError> {
        let length = audio.len() as u64;
        let mime = audio
            .content_type
            .clone()
            .unwrap_or_else(|| DEFAULT_AUDIO_MIME.to_string());

        let part = Part::stream_with_length(audio.data, length)
            .file_name(audio.file_name)
            .mime_str(&mime)
            .map_err(|e| STTError::ConfigurationError(format!("Invalid MIME type: {e}")))?;

        Ok(Form::new().part(AUDIO_FIELD, part))
    }
}

#[async_trait]
impl BaseSTT for GladiaSTT {
    async fn transcribe(&self, audio: AudioUpload) -> Result<String, STTError> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            STTError::ConfigurationError("Gladia API key not configured".to_string())
        })?;

        debug!(
            "Uploading {} bytes of audio ({}) to Gladia",
            audio.len(),
            audio.file_name
        );

        let form = Self::build_form(audio)?;
        let timeout = self.config.timeout;

        let response = self
            .http_client
            .post(&self.config.api_url)
            .header(GLADIA_KEY_HEADER, api_key)
            .multipart(form)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| STTError::from_reqwest(e, timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| STTError::from_reqwest(e, timeout))?;

        if !status.is_success() {
            warn!("Gladia returned {}: {}", status, body);
            return Err(STTError::ProviderError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GladiaTranscriptionResponse = serde_json::from_str(&body)
            .map_err(|e| STTError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        parsed
            .text
            .ok_or_else(|| STTError::InvalidResponse("Response has no text field".to_string()))
    }

    fn provider_name(&self) -> &'static str {
        "gladia"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, api_key: Option<&str>) -> GladiaSTT {
        GladiaSTT::new(
            Client::new(),
            GladiaSTTConfig {
                api_url: format!("{}/v2/upload", server.uri()),
                api_key: api_key.map(str::to_string),
                timeout: Duration::from_secs(5),
            },
        )
    }

    fn sample_upload() -> AudioUpload {
        AudioUpload::new(vec![0x52, 0x49, 0x46, 0x46, 0, 0, 0, 0], "speech.wav")
            .with_content_type("audio/wav")
    }

    #[tokio::test]
    async fn test_transcribe_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/upload"))
            .and(header(GLADIA_KEY_HEADER, "gladia-test-key"))
            .and(header_exists("content-type"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"text": " hi "})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let stt = client_for(&server, Some("gladia-test-key"));
        let text = stt.transcribe(sample_upload()).await.unwrap();

        // Trimming is the caller's policy
        assert_eq!(text, " hi ");
    }

    #[tokio::test]
    async fn test_transcribe_sends_audio_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"text": "x"})))
            .mount(&server)
            .await;

        let stt = client_for(&server, Some("key"));
        stt.transcribe(sample_upload()).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("name=\"audio\""));
        assert!(body.contains("filename=\"speech.wav\""));
        assert!(body.contains("audio/wav"));
    }

    #[tokio::test]
    async fn test_transcribe_missing_text_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"audio_url": "x"})),
            )
            .mount(&server)
            .await;

        let stt = client_for(&server, Some("key"));
        let err = stt.transcribe(sample_upload()).await.unwrap_err();
        assert!(matches!(err, STTError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_transcribe_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let stt = client_for(&server, Some("bad-key"));
        match stt.transcribe(sample_upload()).await.unwrap_err() {
            STTError::ProviderError { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "unauthorized");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transcribe_without_key_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let stt = client_for(&server, None);
        let err = stt.transcribe(sample_upload()).await.unwrap_err();
        assert!(matches!(err, STTError::ConfigurationError(_)));
    }

    #[tokio::test]
    async fn test_transcribe_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"text": "late"}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let stt = GladiaSTT::new(
            Client::new(),
            GladiaSTTConfig {
                api_url: server.uri(),
                api_key: Some("key".to_string()),
                timeout: Duration::from_millis(50),
            },
        );

        let err = stt.transcribe(sample_upload()).await.unwrap_err();
        assert!(matches!(err, STTError::Timeout(_)));
    }
}
