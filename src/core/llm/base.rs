use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Speaker of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

/// One completion call: the newest user text plus the full ordered message list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub messages: Vec<ChatMessage>,
}

impl CompletionRequest {
    /// Lay out a turn as persona instruction, prior history in order, then the
    /// transcript as the newest user message.
    pub fn for_turn(system_prompt: &str, history: Vec<ChatMessage>, transcript: &str) -> Self {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(system_prompt));
        messages.extend(history);
        messages.push(ChatMessage::user(transcript));

        Self {
            prompt: transcript.to_string(),
            messages,
        }
    }
}

#[derive(Debug, Error)]
pub enum LLMError {
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

impl LLMError {
    pub(crate) fn from_reqwest(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            LLMError::Timeout(timeout)
        } else {
            LLMError::NetworkError(error.to_string())
        }
    }
}

/// Non-streaming chat completion.
#[async_trait]
pub trait BaseLLM: Send + Sync {
    /// Return the reply text for the request.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LLMError>;

    fn provider_name(&self) -> &'static str;
}
