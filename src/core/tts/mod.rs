mod base;
pub mod cartesia;

pub use base::{AudioStream, BaseTTS, SynthesizedAudio, TTSError};
pub use cartesia::{CARTESIA_TTS_URL, CartesiaTTS, CartesiaTTSConfig};
