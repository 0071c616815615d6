use std::path::PathBuf;

use super::yaml::YamlConfig;
use super::{ServerConfig, TlsConfig};

/// Apply YAML overrides on top of an environment-derived configuration.
///
/// Only values present in the YAML document replace the base values.
pub(super) fn merge_config(mut config: ServerConfig, yaml: YamlConfig) -> ServerConfig {
    if let Some(server) = yaml.server {
        if let Some(host) = server.host {
            config.host = host;
        }
        if let Some(port) = server.port {
            config.port = port;
        }
        if let Some(tls) = server.tls {
            if tls.enabled == Some(false) {
                config.tls = None;
            } else if let (Some(cert), Some(key)) = (tls.cert_path, tls.key_path) {
                config.tls = Some(TlsConfig {
                    cert_path: PathBuf::from(cert),
                    key_path: PathBuf::from(key),
                });
            }
        }
    }

    if let Some(providers) = yaml.providers {
        if providers.gladia_api_key.is_some() {
            config.gladia_api_key = providers.gladia_api_key;
        }
        if providers.arliai_api_key.is_some() {
            config.arliai_api_key = providers.arliai_api_key;
        }
        if providers.cartesia_api_key.is_some() {
            config.cartesia_api_key = providers.cartesia_api_key;
        }
    }

    if let Some(pipeline) = yaml.pipeline {
        let target = &mut config.pipeline;
        if let Some(url) = pipeline.transcription_url {
            target.transcription_url = url;
        }
        if let Some(url) = pipeline.completion_url {
            target.completion_url = url;
        }
        if let Some(model) = pipeline.completion_model {
            target.completion_model = model;
        }
        if let Some(url) = pipeline.synthesis_url {
            target.synthesis_url = url;
        }
        if let Some(model) = pipeline.synthesis_model {
            target.synthesis_model = model;
        }
        if let Some(voice_id) = pipeline.voice_id {
            target.voice_id = voice_id;
        }
        if let Some(prompt) = pipeline.system_prompt {
            target.system_prompt = prompt;
        }
        if let Some(timeout) = pipeline.timeout_seconds {
            target.timeout_seconds = timeout;
        }
        if let Some(limit) = pipeline.max_upload_bytes {
            target.max_upload_bytes = limit;
        }
    }

    if let Some(security) = yaml.security {
        if security.cors_allowed_origins.is_some() {
            config.cors_allowed_origins = security.cors_allowed_origins;
        }
        if let Some(rps) = security.rate_limit_requests_per_second {
            config.rate_limit_requests_per_second = rps;
        }
        if let Some(burst) = security.rate_limit_burst_size {
            config.rate_limit_burst_size = burst;
        }
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::yaml::{PipelineYaml, ServerYaml, TlsYaml};

    #[test]
    fn test_merge_empty_yaml_keeps_base() {
        let mut base = ServerConfig::default();
        base.port = 4321;
        base.arliai_api_key = Some("env-key".to_string());

        let merged = merge_config(base, YamlConfig::default());

        assert_eq!(merged.port, 4321);
        assert_eq!(merged.arliai_api_key, Some("env-key".to_string()));
    }

    #[test]
    fn test_merge_tls_disabled_clears_env_tls() {
        let mut base = ServerConfig::default();
        base.tls = Some(TlsConfig {
            cert_path: PathBuf::from("/env/cert.pem"),
            key_path: PathBuf::from("/env/key.pem"),
        });

        let yaml = YamlConfig {
            server: Some(ServerYaml {
                tls: Some(TlsYaml {
                    enabled: Some(false),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        };

        assert!(merge_config(base, yaml).tls.is_none());
    }

    #[test]
    fn test_merge_pipeline_partial_override() {
        let yaml = YamlConfig {
            pipeline: Some(PipelineYaml {
                completion_model: Some("Llama-3.3-70B-Instruct".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let merged = merge_config(ServerConfig::default(), yaml);

        assert_eq!(merged.pipeline.completion_model, "Llama-3.3-70B-Instruct");
        assert_eq!(
            merged.pipeline.synthesis_model,
            crate::config::DEFAULT_SYNTHESIS_MODEL
        );
    }
}
