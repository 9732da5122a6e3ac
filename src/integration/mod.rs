//! Wiring between the conversation core, its capability ports and the UI

pub mod config;
pub mod navigation;
pub mod orchestrator;
pub mod ports;
pub mod testing;

pub use config::{
    AssistantConfig, ConversationConfig, RecognitionConfig, SttConfig, TtsConfig, VoiceSettings,
};
pub use navigation::SystemBrowser;
pub use orchestrator::{Orchestrator, OrchestratorBuilder, OrchestratorCommand, OrchestratorHandle};
pub use ports::{
    NavigationPort, SilentSpeechOutput, SpeechInputPort, SpeechOutputPort, UnavailableSpeechInput,
};
