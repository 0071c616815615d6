use std::sync::Arc;

use reqwest::Client;
use tracing::warn;

use crate::config::ServerConfig;
use crate::core::{
    ArliAI, ArliAIConfig, BaseLLM, BaseSTT, BaseTTS, CartesiaTTS, CartesiaTTSConfig, GladiaSTT,
    GladiaSTTConfig,
};

/// Shared state handed to every request.
///
/// The three providers hold clones of one pooled HTTP client; they are
/// stateless between requests, so concurrent conversations never share data.
pub struct AppState {
    pub config: ServerConfig,
    pub stt: Arc<dyn BaseSTT>,
    pub llm: Arc<dyn BaseLLM>,
    pub tts: Arc<dyn BaseTTS>,
}

impl AppState {
    /// Build the production providers from configuration.
    pub fn new(config: ServerConfig) -> Result<Arc<Self>, reqwest::Error> {
        for provider in config.missing_credentials() {
            warn!("{provider} API key is not configured; its stage will fail at request time");
        }

        let http_client = Client::builder()
            .pool_max_idle_per_host(16)
            .build()?;

        let pipeline = &config.pipeline;
        let timeout = pipeline.timeout();

        let stt = GladiaSTT::new(
            http_client.clone(),
            GladiaSTTConfig {
                api_url: pipeline.transcription_url.clone(),
                api_key: config.gladia_api_key.clone(),
                timeout,
            },
        );

        let llm = ArliAI::new(
            http_client.clone(),
            ArliAIConfig {
                api_url: pipeline.completion_url.clone(),
                api_key: config.arliai_api_key.clone(),
                model: pipeline.completion_model.clone(),
                timeout,
            },
        );

        let tts = CartesiaTTS::new(
            http_client,
            CartesiaTTSConfig {
                api_url: pipeline.synthesis_url.clone(),
                api_key: config.cartesia_api_key.clone(),
                model: pipeline.synthesis_model.clone(),
                voice_id: pipeline.voice_id.clone(),
                timeout,
            },
        );

        Ok(Self::with_providers(
            config,
            Arc::new(stt),
            Arc::new(llm),
            Arc::new(tts),
        ))
    }

    /// Assemble state from already-built providers.
    pub fn with_providers(
        config: ServerConfig,
        stt: Arc<dyn BaseSTT>,
        llm: Arc<dyn BaseLLM>,
        tts: Arc<dyn BaseTTS>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            stt,
            llm,
            tts,
        })
    }
}
