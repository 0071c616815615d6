use url::Url;

use super::ServerConfig;

fn validate_http_url(field: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
    let url = Url::parse(value).map_err(|e| format!("Invalid {field} '{value}': {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(format!("Invalid {field} '{value}': unsupported scheme '{scheme}'").into()),
    }
}

/// `*` is only meaningful on its own; inside a list it would be parsed as an
/// origin and abort CORS setup.
fn validate_cors_origins(origins: &str) -> Result<(), Box<dyn std::error::Error>> {
    if origins.trim() == "*" {
        return Ok(());
    }
    if origins.split(',').any(|origin| origin.trim() == "*") {
        return Err(format!(
            "Invalid cors_allowed_origins '{origins}': '*' must be used alone, not in a list"
        )
        .into());
    }
    Ok(())
}

/// Validate a fully merged configuration.
///
/// Missing provider credentials are not an error; the affected stage fails at
/// request time instead, so the server can still boot for health checks.
pub(super) fn validate(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = &config.pipeline;
    validate_http_url("transcription_url", &pipeline.transcription_url)?;
    validate_http_url("completion_url", &pipeline.completion_url)?;
    validate_http_url("synthesis_url", &pipeline.synthesis_url)?;

    if pipeline.timeout_seconds == 0 {
        return Err("timeout_seconds must be greater than zero".into());
    }
    if pipeline.max_upload_bytes == 0 {
        return Err("max_upload_bytes must be greater than zero".into());
    }
    if pipeline.completion_model.trim().is_empty() {
        return Err("completion_model must not be empty".into());
    }
    if pipeline.voice_id.trim().is_empty() {
        return Err("voice_id must not be empty".into());
    }
    if config.rate_limit_requests_per_second == 0 {
        return Err("rate_limit_requests_per_second must be greater than zero".into());
    }

    if let Some(origins) = config.cors_allowed_origins.as_deref() {
        validate_cors_origins(origins)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn test_rejects_unparseable_url() {
        let mut config = ServerConfig::default();
        config.pipeline.completion_url = "not a url".to_string();

        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("completion_url"));
    }

    #[test]
    fn test_accepts_plain_http_for_local_upstreams() {
        let mut config = ServerConfig::default();
        config.pipeline.transcription_url = "http://127.0.0.1:9000/v2/upload".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let mut config = ServerConfig::default();
        config.pipeline.timeout_seconds = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_cors_wildcard_alone_is_valid() {
        let mut config = ServerConfig::default();
        config.cors_allowed_origins = Some(" * ".to_string());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_cors_wildcard_in_list_is_rejected() {
        let mut config = ServerConfig::default();
        config.cors_allowed_origins = Some("https://app.example.com, *".to_string());

        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("cors_allowed_origins"));
    }

    #[test]
    fn test_cors_origin_list_is_valid() {
        let mut config = ServerConfig::default();
        config.cors_allowed_origins =
            Some("https://app.example.com,https://admin.example.com".to_string());
        assert!(validate(&config).is_ok());
    }
}
