use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use super::{PipelineConfig, ServerConfig, TlsConfig};

/// Read a variable, treating empty values as unset.
fn env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T>(key: &str) -> Result<Option<T>, Box<dyn std::error::Error>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| format!("Invalid value for {key}: {e}").into()),
        None => Ok(None),
    }
}

/// Build a configuration from environment variables, falling back to defaults.
pub(super) fn load_from_env() -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let defaults = PipelineConfig::default();

    let tls = match (env_var("TLS_CERT_PATH"), env_var("TLS_KEY_PATH")) {
        (Some(cert), Some(key)) => Some(TlsConfig {
            cert_path: PathBuf::from(cert),
            key_path: PathBuf::from(key),
        }),
        (None, None) => None,
        _ => {
            return Err(
                "TLS_CERT_PATH and TLS_KEY_PATH must be set together to enable TLS".into(),
            );
        }
    };

    let pipeline = PipelineConfig {
        transcription_url: env_var("TRANSCRIPTION_URL").unwrap_or(defaults.transcription_url),
        completion_url: env_var("COMPLETION_URL").unwrap_or(defaults.completion_url),
        completion_model: env_var("COMPLETION_MODEL").unwrap_or(defaults.completion_model),
        synthesis_url: env_var("SYNTHESIS_URL").unwrap_or(defaults.synthesis_url),
        synthesis_model: env_var("SYNTHESIS_MODEL").unwrap_or(defaults.synthesis_model),
        voice_id: env_var("SYNTHESIS_VOICE_ID").unwrap_or(defaults.voice_id),
        system_prompt: env_var("SYSTEM_PROMPT").unwrap_or(defaults.system_prompt),
        timeout_seconds: parse_env("UPSTREAM_TIMEOUT_SECONDS")?
            .unwrap_or(defaults.timeout_seconds),
        max_upload_bytes: parse_env("MAX_UPLOAD_BYTES")?.unwrap_or(defaults.max_upload_bytes),
    };

    Ok(ServerConfig {
        host: env_var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
        port: parse_env("PORT")?.unwrap_or(3001),
        tls,
        gladia_api_key: env_var("GLADIA_API_KEY"),
        arliai_api_key: env_var("ARLI_AI_KEY"),
        cartesia_api_key: env_var("CARTESIA_API_KEY"),
        pipeline,
        cors_allowed_origins: env_var("CORS_ALLOWED_ORIGINS"),
        rate_limit_requests_per_second: parse_env("RATE_LIMIT_REQUESTS_PER_SECOND")?
            .unwrap_or(60),
        rate_limit_burst_size: parse_env("RATE_LIMIT_BURST_SIZE")?.unwrap_or(10),
    })
}
