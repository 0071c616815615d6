//! Arli AI chat completion client.
//!
//! # API Reference
//!
//! - Endpoint: `POST https://api.arliai.com/v1/chat/completions`
//! - Auth: `Authorization: Bearer <key>`
//! - Request: `{model, prompt, messages: [{role, content}]}`
//! - Response: JSON object whose `response` field holds the reply text

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::base::{BaseLLM, ChatMessage, CompletionRequest, LLMError};

/// Arli AI chat completion endpoint
pub const ARLIAI_COMPLETION_URL: &str = "https://api.arliai.com/v1/chat/completions";

#[derive(Debug, Serialize)]
struct ArliCompletionBody<'a> {
    model: &'a str,
    prompt: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ArliCompletionResponse {
    response: Option<String>,
}

#[derive(Clone)]
pub struct ArliAIConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

/// Arli AI client implementing [`BaseLLM`].
pub struct ArliAI {
    config: ArliAIConfig,
    http_client: Client,
}

impl ArliAI {
    pub fn new(http_client: Client, config: ArliAIConfig) -> Self {
        Self {
            config,
            http_client,
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl BaseLLM for ArliAI {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LLMError> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            LLMError::ConfigurationError("Arli AI API key not configured".to_string())
        })?;

        let body = ArliCompletionBody {
            model: &self.config.model,
            prompt: &request.prompt,
            messages: &request.messages,
        };

        debug!(
            "Requesting completion from {} with {} messages",
            self.config.model,
            request.messages.len()
        );

        let timeout = self.config.timeout;
        let response = self
            .http_client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| LLMError::from_reqwest(e, timeout))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LLMError::from_reqwest(e, timeout))?;

        if !status.is_success() {
            warn!("Arli AI returned {}: {}", status, text);
            return Err(LLMError::ProviderError {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: ArliCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| LLMError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        parsed
            .response
            .ok_or_else(|| LLMError::InvalidResponse("Response has no response field".to_string()))
    }

    fn provider_name(&self) -> &'static str {
        "arliai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ArliAI {
        ArliAI::new(
            Client::new(),
            ArliAIConfig {
                api_url: format!("{}/v1/chat/completions", server.uri()),
                api_key: Some("arli-test-key".to_string()),
                model: "Meta-Llama-3.1-8B-Instruct".to_string(),
                timeout: Duration::from_secs(5),
            },
        )
    }

    #[tokio::test]
    async fn test_complete_sends_expected_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer arli-test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "Hi there"})))
            .expect(1)
            .mount(&server)
            .await;

        let llm = client_for(&server);
        let request = CompletionRequest::for_turn(
            "persona",
            vec![ChatMessage::user("earlier"), ChatMessage::assistant("reply")],
            "hello",
        );

        let reply = llm.complete(&request).await.unwrap();
        assert_eq!(reply, "Hi there");

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "Meta-Llama-3.1-8B-Instruct",
                "prompt": "hello",
                "messages": [
                    {"role": "system", "content": "persona"},
                    {"role": "user", "content": "earlier"},
                    {"role": "assistant", "content": "reply"},
                    {"role": "user", "content": "hello"}
                ]
            })
        );
    }

    #[tokio::test]
    async fn test_complete_missing_response_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let llm = client_for(&server);
        let request = CompletionRequest::for_turn("persona", Vec::new(), "hello");
        let err = llm.complete(&request).await.unwrap_err();
        assert!(matches!(err, LLMError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_complete_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let llm = client_for(&server);
        let request = CompletionRequest::for_turn("persona", Vec::new(), "hello");
        match llm.complete(&request).await.unwrap_err() {
            LLMError::ProviderError { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_complete_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"response": "too late"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let llm = ArliAI::new(
            Client::new(),
            ArliAIConfig {
                api_url: format!("{}/v1/chat/completions", server.uri()),
                api_key: Some("arli-test-key".to_string()),
                model: "Meta-Llama-3.1-8B-Instruct".to_string(),
                timeout: Duration::from_millis(100),
            },
        );

        let request = CompletionRequest::for_turn("persona", Vec::new(), "hello");
        let err = llm.complete(&request).await.unwrap_err();
        assert!(matches!(err, LLMError::Timeout(t) if t == Duration::from_millis(100)));
    }

    #[tokio::test]
    async fn test_complete_network_error() {
        let llm = ArliAI::new(
            Client::new(),
            ArliAIConfig {
                // Port 9 (discard) is not listening in test environments
                api_url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
                api_key: Some("key".to_string()),
                model: "m".to_string(),
                timeout: Duration::from_secs(2),
            },
        );

        let request = CompletionRequest::for_turn("persona", Vec::new(), "hello");
        let err = llm.complete(&request).await.unwrap_err();
        assert!(matches!(
            err,
            LLMError::NetworkError(_) | LLMError::Timeout(_)
        ));
    }
}
