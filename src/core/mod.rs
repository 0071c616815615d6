pub mod llm;
pub mod stt;
pub mod tts;

// Re-export commonly used types for convenience
pub use stt::{AudioUpload, BaseSTT, GladiaSTT, GladiaSTTConfig, STTError};

pub use llm::{ArliAI, ArliAIConfig, BaseLLM, ChatMessage, ChatRole, CompletionRequest, LLMError};

pub use tts::{BaseTTS, CartesiaTTS, CartesiaTTSConfig, SynthesizedAudio, TTSError};
