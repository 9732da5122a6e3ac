//! Native speech backends
//!
//! - Speech-to-text using Whisper, with Silero VAD endpointing
//! - Text-to-speech using VITS through sherpa-onnx
//!
//! Both engines are behind the `speech` feature. Text normalization and
//! endpointing are plain Rust and always built.

pub mod endpoint;
pub mod normalize;
#[cfg(feature = "speech")]
pub mod stt;
#[cfg(feature = "speech")]
pub mod tts;

pub use endpoint::{Endpoint, EndpointConfig, Endpointer};
pub use normalize::normalize_text_for_tts;
#[cfg(feature = "speech")]
pub use stt::WhisperSpeechInput;
#[cfg(feature = "speech")]
pub use tts::SherpaSpeechOutput;
