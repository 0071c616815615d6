//! Request-level error type for the conversation endpoint.
//!
//! Every failure a caller can observe is one of these variants, and each maps
//! to a fixed status code and plain-text body. Upstream details are logged,
//! never returned.

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Result type for handler-level operations
pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    /// The multipart payload is malformed or violates the form schema
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Transcription produced no usable text
    #[error("Invalid audio")]
    InvalidAudio,

    /// The completion service failed or returned no reply
    #[error("Text completion failed: {0}")]
    CompletionFailed(String),

    /// The synthesis service rejected the request or could not be reached
    #[error("Voice synthesis failed: {0}")]
    SynthesisFailed(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) | AppError::InvalidAudio => StatusCode::BAD_REQUEST,
            AppError::CompletionFailed(_) | AppError::SynthesisFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Body text returned to the caller.
    pub fn public_message(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => "Invalid request",
            AppError::InvalidAudio => "Invalid audio",
            AppError::CompletionFailed(_) => "Text completion failed",
            AppError::SynthesisFailed(_) => "Voice synthesis failed",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.public_message(),
        )
            .into_response()
    }
}
