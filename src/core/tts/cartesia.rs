//! Cartesia bytes-endpoint synthesis.
//!
//! The endpoint answers with a chunked body of raw PCM samples. The request
//! deadline applies to reaching the response headers only, so long replies
//! keep streaming after it has passed.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use super::base::{BaseTTS, SynthesizedAudio, TTSError};

/// Cartesia bytes endpoint
pub const CARTESIA_TTS_URL: &str = "https://api.cartesia.ai/tts/bytes";
/// API version pinned in the `Cartesia-Version` header
pub const CARTESIA_VERSION: &str = "2024-06-30";
/// Output sample rate in Hz
pub const CARTESIA_SAMPLE_RATE: u32 = 24_000;

#[derive(Debug, Serialize)]
struct CartesiaVoice<'a> {
    mode: &'static str,
    id: &'a str,
}

#[derive(Debug, Serialize)]
struct CartesiaOutputFormat {
    container: &'static str,
    encoding: &'static str,
    sample_rate: u32,
}

#[derive(Debug, Serialize)]
struct CartesiaRequest<'a> {
    model_id: &'a str,
    transcript: &'a str,
    voice: CartesiaVoice<'a>,
    output_format: CartesiaOutputFormat,
}

#[derive(Clone)]
pub struct CartesiaTTSConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub voice_id: String,
    /// Deadline for the response headers.
    pub timeout: Duration,
}

pub struct CartesiaTTS {
    config: CartesiaTTSConfig,
    http_client: Client,
}

impl CartesiaTTS {
    pub fn new(http_client: Client, config: CartesiaTTSConfig) -> Self {
        Self {
            config,
            http_client,
        }
    }

    fn build_request<'a>(&'a self, text: &'a str) -> CartesiaRequest<'a> {
        CartesiaRequest {
            model_id: &self.config.model,
            transcript: text,
            voice: CartesiaVoice {
                mode: "id",
                id: &self.config.voice_id,
            },
            output_format: CartesiaOutputFormat {
                container: "raw",
                encoding: "pcm_f32le",
                sample_rate: CARTESIA_SAMPLE_RATE,
            },
        }
    }
}

#[async_trait]
impl BaseTTS for CartesiaTTS {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, TTSError> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            TTSError::ConfigurationError("Cartesia API key not configured".to_string())
        })?;

        debug!(
            "Synthesizing {} chars with voice {}",
            text.len(),
            self.config.voice_id
        );

        let send = self
            .http_client
            .post(&self.config.api_url)
            .header("X-API-Key", api_key)
            .header("Cartesia-Version", CARTESIA_VERSION)
            .json(&self.build_request(text))
            .send();

        let timeout = self.config.timeout;
        let response = tokio::time::timeout(timeout, send)
            .await
            .map_err(|_| TTSError::Timeout(timeout))?
            .map_err(|e| TTSError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // The error body shares the header deadline so a stalled body cannot hang the request
            let body = match tokio::time::timeout(timeout, response.text()).await {
                Ok(Ok(body)) => body,
                Ok(Err(e)) => {
                    warn!("Failed to read Cartesia error body: {}", e);
                    String::new()
                }
                Err(_) => {
                    warn!("Timed out reading Cartesia error body after {:?}", timeout);
                    String::new()
                }
            };
            warn!("Cartesia returned {}: {}", status, body);
            return Err(TTSError::ProviderError {
                status: status.as_u16(),
                body,
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| TTSError::StreamError(e.to_string())));

        Ok(SynthesizedAudio {
            content_type,
            stream: Box::pin(stream),
        })
    }

    fn provider_name(&self) -> &'static str {
        "cartesia"
    }
}
