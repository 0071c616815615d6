//! HTTP request handlers
//!
//! - `api` - Health check endpoint
//! - `converse` - Voice conversation endpoint (transcribe, complete, synthesize)

pub mod api;
pub mod converse;

pub use converse::converse_handler;
