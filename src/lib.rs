pub mod audio;
pub mod avatar;
pub mod capture;
pub mod commands;
pub mod conversation;
pub mod integration;
pub mod messages;
pub mod speech;
pub mod ui;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum AriaError {
    #[error("Speech capture unavailable: {0}")]
    CaptureUnavailable(String),

    #[error("Speech capture failed: {0}")]
    CaptureFailure(String),

    #[error("Speech output error: {0}")]
    SpeechOutputError(String),

    #[error("Navigation error: {0}")]
    NavigationError(String),

    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    #[error("Model load error: {0}")]
    ModelLoadError(String),

    #[error("Audio processing error: {0}")]
    AudioProcessingError(String),

    #[error("IO error: {0}")]
    IOError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("Orchestrator error: {0}")]
    OrchestratorError(String),
}

impl From<std::io::Error> for AriaError {
    fn from(e: std::io::Error) -> Self {
        AriaError::IOError(e.to_string())
    }
}

impl AriaError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Capability is missing from this environment, retrying won't help
            AriaError::CaptureUnavailable(_) => false,
            AriaError::CaptureFailure(_) => true,
            AriaError::SpeechOutputError(_) => true,
            AriaError::NavigationError(_) => true,
            // Hardware/device errors may require user intervention
            AriaError::AudioDeviceError(_) => false,
            AriaError::ModelLoadError(_) => false,
            AriaError::AudioProcessingError(_) => true,
            AriaError::IOError(_) => false,
            AriaError::ConfigError(_) => false,
            AriaError::ChannelError(_) => false,
            AriaError::OrchestratorError(_) => true,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            AriaError::CaptureUnavailable(_) => {
                "Voice input is not available on this system.".to_string()
            }
            AriaError::CaptureFailure(_) => {
                "Could not process voice input. Please try again.".to_string()
            }
            AriaError::SpeechOutputError(_) => {
                "Text-to-speech failed. The reply is shown as text.".to_string()
            }
            AriaError::NavigationError(_) => {
                "Could not open the browser.".to_string()
            }
            AriaError::AudioDeviceError(_) => {
                "Audio device error. Please check your microphone/speakers.".to_string()
            }
            AriaError::ModelLoadError(_) => {
                "Failed to load speech model. Please verify model files are present.".to_string()
            }
            AriaError::AudioProcessingError(_) => {
                "Audio processing failed. Please try again.".to_string()
            }
            AriaError::IOError(_) => "File system error occurred.".to_string(),
            AriaError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
            AriaError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
            AriaError::OrchestratorError(_) => {
                "System error occurred. Please try again.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AriaError>;
