//! Configuration module for the NIDAAM gateway
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML overrides onto the environment configuration
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use nidaam_gateway::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable base
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

mod env;
mod merge;
mod validation;
mod yaml;

pub use yaml::YamlConfig;

/// Gladia pre-recorded upload endpoint.
pub const DEFAULT_TRANSCRIPTION_URL: &str = crate::core::stt::GLADIA_STT_URL;
/// Arli AI chat completion endpoint.
pub const DEFAULT_COMPLETION_URL: &str = crate::core::llm::ARLIAI_COMPLETION_URL;
/// Cartesia bytes endpoint (chunked body).
pub const DEFAULT_SYNTHESIS_URL: &str = crate::core::tts::CARTESIA_TTS_URL;
pub const DEFAULT_COMPLETION_MODEL: &str = "Meta-Llama-3.1-8B-Instruct";
pub const DEFAULT_SYNTHESIS_MODEL: &str = "sonic-english";
pub const DEFAULT_VOICE_ID: &str = "79a125e8-cd45-4c13-8a67-188112f4dd22";
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "- You are NIDAAM, an advanced AI assistant. Be helpful and concise.";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECONDS: u64 = 30;
/// 25 MiB, enough for a few minutes of compressed speech.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// TLS configuration for HTTPS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// Settings for the three upstream stages of a conversational turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub transcription_url: String,
    pub completion_url: String,
    pub completion_model: String,
    pub synthesis_url: String,
    pub synthesis_model: String,
    /// Cartesia voice identity used for every reply
    pub voice_id: String,
    /// Persona instruction placed first in every completion request
    pub system_prompt: String,
    /// Upper bound for each outbound call (seconds)
    pub timeout_seconds: u64,
    /// Largest accepted multipart body (bytes)
    pub max_upload_bytes: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            transcription_url: DEFAULT_TRANSCRIPTION_URL.to_string(),
            completion_url: DEFAULT_COMPLETION_URL.to_string(),
            completion_model: DEFAULT_COMPLETION_MODEL.to_string(),
            synthesis_url: DEFAULT_SYNTHESIS_URL.to_string(),
            synthesis_model: DEFAULT_SYNTHESIS_MODEL.to_string(),
            voice_id: DEFAULT_VOICE_ID.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            timeout_seconds: DEFAULT_UPSTREAM_TIMEOUT_SECONDS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl PipelineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Server configuration
///
/// Contains all configuration needed to run the gateway:
/// - Server settings (host, port, TLS)
/// - Provider credentials (Gladia, Arli AI, Cartesia)
/// - Pipeline settings (endpoints, models, voice, persona, timeouts)
/// - Security settings (CORS, rate limiting)
#[derive(Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // TLS configuration (optional)
    pub tls: Option<TlsConfig>,

    // Provider API keys
    /// Gladia API key for transcription
    pub gladia_api_key: Option<String>,
    /// Arli AI API key for chat completion
    pub arliai_api_key: Option<String>,
    /// Cartesia API key for Sonic voice synthesis
    pub cartesia_api_key: Option<String>,

    pub pipeline: PipelineConfig,

    // Security configuration
    /// CORS allowed origins (comma-separated list or "*" for all)
    /// Default: None (CORS disabled, same-origin only)
    pub cors_allowed_origins: Option<String>,

    // Rate limiting configuration
    /// Maximum requests per second per IP address
    /// Default: 60
    pub rate_limit_requests_per_second: u32,
    /// Maximum burst size for rate limiting
    /// Default: 10
    pub rate_limit_burst_size: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            tls: None,
            gladia_api_key: None,
            arliai_api_key: None,
            cartesia_api_key: None,
            pipeline: PipelineConfig::default(),
            cors_allowed_origins: None,
            rate_limit_requests_per_second: 60,
            rate_limit_burst_size: 10,
        }
    }
}

fn redact(secret: &Option<String>) -> &'static str {
    if secret.is_some() { "[REDACTED]" } else { "None" }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("tls", &self.tls)
            .field("gladia_api_key", &redact(&self.gladia_api_key))
            .field("arliai_api_key", &redact(&self.arliai_api_key))
            .field("cartesia_api_key", &redact(&self.cartesia_api_key))
            .field("pipeline", &self.pipeline)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field(
                "rate_limit_requests_per_second",
                &self.rate_limit_requests_per_second,
            )
            .field("rate_limit_burst_size", &self.rate_limit_burst_size)
            .finish()
    }
}

/// Implement Drop to zeroize all secret fields when ServerConfig is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.gladia_api_key {
            key.zeroize();
        }
        if let Some(ref mut key) = self.arliai_api_key {
            key.zeroize();
        }
        if let Some(ref mut key) = self.cartesia_api_key {
            key.zeroize();
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// The `.env` file is loaded by `main` before this is called, so actual
    /// environment variables override `.env` values.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = env::load_from_env()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(env::load_from_env()?, yaml_config);
        validation::validate(&config)?;
        Ok(config)
    }

    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if TLS is enabled
    pub fn is_tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    /// Get API key for a specific provider
    ///
    /// # Arguments
    /// * `provider` - The name of the provider ("gladia", "arliai" or "cartesia")
    ///
    /// # Returns
    /// * `Result<String, String>` - The API key on success, or an error message on failure
    pub fn get_api_key(&self, provider: &str) -> Result<String, String> {
        match provider.to_lowercase().as_str() {
            "gladia" => self.gladia_api_key.as_ref().cloned().ok_or_else(|| {
                "Gladia API key not configured in server environment".to_string()
            }),
            "arliai" | "arli-ai" | "arli_ai" => {
                self.arliai_api_key.as_ref().cloned().ok_or_else(|| {
                    "Arli AI API key not configured in server environment".to_string()
                })
            }
            "cartesia" => self.cartesia_api_key.as_ref().cloned().ok_or_else(|| {
                "Cartesia API key not configured in server environment".to_string()
            }),
            _ => Err(format!("Unsupported provider: {provider}")),
        }
    }

    /// Names of providers whose credential is absent.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        ["gladia", "arliai", "cartesia"]
            .into_iter()
            .filter(|provider| self.get_api_key(provider).is_err())
            .collect()
    }
}
