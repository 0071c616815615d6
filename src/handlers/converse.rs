//! The conversation endpoint.
//!
//! One request runs three strictly sequential stages: transcription of the
//! caller's input (skipped for text), completion over the conversation
//! history, and synthesis of the reply. The synthesized audio is streamed
//! back as it arrives, with the transcript and reply in response headers.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartRejection},
    },
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    response::Response,
};
use futures::TryStreamExt;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::core::{AudioUpload, ChatMessage, ChatRole, CompletionRequest};
use crate::errors::{AppError, AppResult};
use crate::state::AppState;
use crate::utils::{StageTimer, StreamTimer, encoded_header_value};

pub const X_TRANSCRIPT: HeaderName = HeaderName::from_static("x-transcript");
pub const X_RESPONSE: HeaderName = HeaderName::from_static("x-response");
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
const X_VERCEL_ID: HeaderName = HeaderName::from_static("x-vercel-id");

const INPUT_FIELD: &str = "input";
const MESSAGE_FIELD: &str = "message";

/// The caller's newest turn.
#[derive(Debug, Clone)]
pub enum UserInput {
    Text(String),
    Audio(AudioUpload),
}

/// A validated request body.
#[derive(Debug, Clone)]
pub struct ConverseRequest {
    pub input: UserInput,
    pub messages: Vec<ChatMessage>,
}

/// Roles a caller may put in its history. `system` is reserved for the
/// persona entry and rejected here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum InboundRole {
    User,
    Assistant,
}

#[derive(Debug, Deserialize)]
struct InboundMessage {
    role: InboundRole,
    content: String,
}

impl From<InboundMessage> for ChatMessage {
    fn from(message: InboundMessage) -> Self {
        let role = match message.role {
            InboundRole::User => ChatRole::User,
            InboundRole::Assistant => ChatRole::Assistant,
        };
        ChatMessage::new(role, message.content)
    }
}

/// Take the request id from `x-request-id`, then `x-vercel-id`, else mint one.
pub fn request_id(headers: &HeaderMap) -> String {
    [X_REQUEST_ID, X_VERCEL_ID]
        .iter()
        .filter_map(|name| headers.get(name))
        .filter_map(|value| value.to_str().ok())
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

async fn read_input(field: Field<'_>) -> AppResult<UserInput> {
    if let Some(file_name) = field.file_name().map(str::to_string) {
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidRequest(format!("Failed to read audio: {e}")))?;

        if data.is_empty() {
            return Err(AppError::InvalidRequest("Audio file is empty".to_string()));
        }

        let mut upload = AudioUpload::new(data, file_name);
        if let Some(content_type) = content_type {
            upload = upload.with_content_type(content_type);
        }
        return Ok(UserInput::Audio(upload));
    }

    let text = field
        .text()
        .await
        .map_err(|e| AppError::InvalidRequest(format!("Failed to read input: {e}")))?;

    if text.trim().is_empty() {
        return Err(AppError::InvalidRequest("Input text is empty".to_string()));
    }
    Ok(UserInput::Text(text))
}

async fn read_message(field: Field<'_>) -> AppResult<ChatMessage> {
    let raw = field
        .bytes()
        .await
        .map_err(|e| AppError::InvalidRequest(format!("Failed to read message: {e}")))?;

    let message: InboundMessage = serde_json::from_slice(&raw)
        .map_err(|e| AppError::InvalidRequest(format!("Malformed message: {e}")))?;
    Ok(message.into())
}

/// Validate the multipart body into a [`ConverseRequest`].
pub async fn parse_form(mut multipart: Multipart) -> AppResult<ConverseRequest> {
    let mut input = None;
    let mut messages = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(INPUT_FIELD) => {
                if input.is_some() {
                    return Err(AppError::InvalidRequest(
                        "Duplicate input field".to_string(),
                    ));
                }
                input = Some(read_input(field).await?);
            }
            Some(MESSAGE_FIELD) => messages.push(read_message(field).await?),
            other => debug!("Ignoring form field {:?}", other),
        }
    }

    let input = input.ok_or_else(|| AppError::InvalidRequest("Missing input field".to_string()))?;
    Ok(ConverseRequest { input, messages })
}

/// Resolve the transcript; `None` means the audio could not be understood.
async fn transcribe(state: &AppState, input: UserInput, request_id: &str) -> Option<String> {
    let upload = match input {
        UserInput::Text(text) => return Some(text),
        UserInput::Audio(upload) => upload,
    };

    let timer = StageTimer::start(request_id, "transcription");
    let result = state.stt.transcribe(upload).await;
    timer.finish();

    match result {
        Ok(text) => {
            let text = text.trim();
            if text.is_empty() {
                warn!(request_id = %request_id, "Transcription returned no text");
                None
            } else {
                Some(text.to_string())
            }
        }
        Err(e) => {
            warn!(request_id = %request_id, "Transcription failed: {}", e);
            None
        }
    }
}

/// Handler for POST /api and POST /converse
///
/// Accepts `multipart/form-data` with one `input` (text or audio file) and any
/// number of JSON `message` parts holding prior turns. Responds with the
/// synthesized reply as a raw PCM stream.
pub async fn converse_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let request_id = request_id(&headers);

    let multipart = multipart.map_err(|e| {
        warn!(request_id = %request_id, "Rejected request body: {}", e);
        AppError::InvalidRequest(e.body_text())
    })?;

    let request = parse_form(multipart).await.inspect_err(|e| {
        warn!(request_id = %request_id, "{}", e);
    })?;

    let transcript = transcribe(&state, request.input, &request_id)
        .await
        .ok_or(AppError::InvalidAudio)?;

    let completion =
        CompletionRequest::for_turn(&state.config.pipeline.system_prompt, request.messages, &transcript);

    let timer = StageTimer::start(&request_id, "completion");
    let reply = state.llm.complete(&completion).await;
    timer.finish();
    let reply = reply.map_err(|e| {
        error!(request_id = %request_id, "Completion failed: {}", e);
        AppError::CompletionFailed(e.to_string())
    })?;

    let timer = StageTimer::start(&request_id, "synthesis");
    let audio = state.tts.synthesize(&reply).await;
    timer.finish();
    let audio = audio.map_err(|e| {
        error!(request_id = %request_id, "Synthesis failed: {}", e);
        AppError::SynthesisFailed(e.to_string())
    })?;

    info!(
        request_id = %request_id,
        transcript_chars = transcript.chars().count(),
        reply_chars = reply.chars().count(),
        "Streaming synthesized reply"
    );

    let content_type = audio
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));

    let stream_request_id = request_id.clone();
    let stream = audio.stream.inspect_err(move |e| {
        error!(request_id = %stream_request_id, "Audio stream aborted: {}", e);
    });
    let body = Body::from_stream(StreamTimer::new(stream, &request_id));

    let mut response = Response::new(body);
    *response.status_mut() = StatusCode::OK;
    let response_headers = response.headers_mut();
    response_headers.insert(header::CONTENT_TYPE, content_type);
    response_headers.insert(X_TRANSCRIPT, encoded_header_value(&transcript));
    response_headers.insert(X_RESPONSE, encoded_header_value(&reply));
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response_headers.insert(X_REQUEST_ID, value);
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_prefers_x_request_id() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("req-abc"));
        headers.insert(X_VERCEL_ID, HeaderValue::from_static("vercel-xyz"));
        assert_eq!(request_id(&headers), "req-abc");
    }

    #[test]
    fn test_request_id_falls_back_to_vercel_id() {
        let mut headers = HeaderMap::new();
        headers.insert(X_VERCEL_ID, HeaderValue::from_static("vercel-xyz"));
        assert_eq!(request_id(&headers), "vercel-xyz");
    }

    #[test]
    fn test_request_id_generated_when_absent() {
        let id = request_id(&HeaderMap::new());
        assert!(uuid::Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_inbound_message_rejects_system_role() {
        let parsed: Result<InboundMessage, _> =
            serde_json::from_str(r#"{"role":"system","content":"x"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_inbound_message_ignores_unknown_keys() {
        let parsed: InboundMessage =
            serde_json::from_str(r#"{"role":"assistant","content":"hi","id":7}"#).unwrap();
        assert_eq!(ChatMessage::from(parsed), ChatMessage::assistant("hi"));
    }

    #[test]
    fn test_inbound_message_requires_string_content() {
        let parsed: Result<InboundMessage, _> =
            serde_json::from_str(r#"{"role":"user","content":42}"#);
        assert!(parsed.is_err());
    }
}
