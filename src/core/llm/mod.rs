pub mod arliai;
mod base;

pub use arliai::{ARLIAI_COMPLETION_URL, ArliAI, ArliAIConfig};
pub use base::{BaseLLM, ChatMessage, ChatRole, CompletionRequest, LLMError};
