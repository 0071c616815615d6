mod base;
pub mod gladia;

// Re-export public types and traits
pub use base::{AudioUpload, BaseSTT, STTError};

// Re-export Gladia implementation
pub use gladia::{GLADIA_STT_URL, GladiaSTT, GladiaSTTConfig};
