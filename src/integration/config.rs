//! Configuration for the assistant
//!
//! Provides centralized configuration for all components. Every section is
//! optional in the TOML file; missing values fall back to defaults.

use crate::commands::SearchConfig;
use crate::conversation::ThinkingDelay;
use crate::{AriaError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "ARIA_CONFIG";

/// Speech synthesis parameters applied to every reply
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    /// Speaking rate (1.0 = normal)
    pub rate: f32,
    /// Pitch (1.0 = normal)
    pub pitch: f32,
    /// Volume (0.0 to 1.0)
    pub volume: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            rate: 0.9,
            pitch: 1.1,
            volume: 0.8,
        }
    }
}

/// One-shot speech recognition settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// BCP 47 language tag
    pub language: String,
    /// Keep listening after the first utterance
    pub continuous: bool,
    /// Report partial transcripts while speaking
    pub interim_results: bool,
    /// Give up on a capture after this many seconds
    pub max_duration_secs: f32,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            continuous: false,
            interim_results: false,
            max_duration_secs: 15.0,
        }
    }
}

impl RecognitionConfig {
    /// Primary language subtag ("en" for "en-US"), as speech models expect
    pub fn language_code(&self) -> &str {
        self.language.split('-').next().unwrap_or(&self.language)
    }
}

/// Conversation turn settings
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Simulated thinking time before a reply
    pub delay: ThinkingDelay,
    /// Voice used to speak replies
    pub voice: VoiceSettings,
}

/// Whisper speech-to-text backend settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SttConfig {
    /// Path to the Whisper model file
    pub model_path: PathBuf,
    /// Number of threads to use for transcription
    pub n_threads: i32,
    /// Speech probability threshold for the VAD
    pub vad_threshold: f32,
    /// Silence that ends an utterance, in seconds
    pub silence_secs: f32,
    /// Shorter captures are treated as no speech, in seconds
    pub min_speech_secs: f32,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/ggml-base.en.bin"),
            n_threads: 4,
            vad_threshold: 0.5,
            silence_secs: 0.8,
            min_speech_secs: 0.3,
        }
    }
}

/// VITS text-to-speech backend settings
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// Path to the ONNX model file
    pub model_path: String,
    /// Path to the tokens file
    pub tokens_path: String,
    /// Path to the lexicon file (optional for some models)
    pub lexicon_path: Option<String>,
    /// Path to the espeak data directory (optional)
    pub data_dir: Option<String>,
    /// Speaker ID for multi-speaker models
    pub speaker_id: i32,
}

/// Configuration for the complete assistant
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub conversation: ConversationConfig,
    pub recognition: RecognitionConfig,
    pub search: SearchConfig,
    pub stt: SttConfig,
    pub tts: TtsConfig,

    /// Whether to offer voice capture
    pub enable_voice_input: bool,

    /// Whether to speak replies
    pub enable_voice_output: bool,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            conversation: ConversationConfig::default(),
            recognition: RecognitionConfig::default(),
            search: SearchConfig::default(),
            stt: SttConfig::default(),
            tts: TtsConfig::default(),
            enable_voice_input: true,
            enable_voice_output: true,
        }
    }
}

impl AssistantConfig {
    /// Load a configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AriaError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: AssistantConfig = toml::from_str(&content).map_err(|e| {
            AriaError::ConfigError(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        config.validate()?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from `$ARIA_CONFIG` or the user config directory.
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load_or_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path),
            Some(path) => {
                debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Location of the config file, if one can be determined
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("aria").join("config.toml"))
    }

    /// Set the thinking delay
    pub fn with_delay(mut self, delay: ThinkingDelay) -> Self {
        self.conversation.delay = delay;
        self
    }

    /// Set the Whisper model path
    pub fn with_whisper_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.stt.model_path = path.into();
        self
    }

    /// Set the TTS model paths
    pub fn with_tts_model(
        mut self,
        model_path: impl Into<String>,
        tokens_path: impl Into<String>,
    ) -> Self {
        self.tts.model_path = model_path.into();
        self.tts.tokens_path = tokens_path.into();
        self
    }

    /// Disable voice capture (text-only input)
    pub fn without_voice_input(mut self) -> Self {
        self.enable_voice_input = false;
        self
    }

    /// Disable spoken replies
    pub fn without_voice_output(mut self) -> Self {
        self.enable_voice_output = false;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.conversation.delay.validate()?;

        let voice = &self.conversation.voice;
        if !(0.1..=10.0).contains(&voice.rate) {
            return Err(AriaError::ConfigError(format!(
                "Voice rate must be between 0.1 and 10, got {}",
                voice.rate
            )));
        }
        if !(0.0..=2.0).contains(&voice.pitch) {
            return Err(AriaError::ConfigError(format!(
                "Voice pitch must be between 0 and 2, got {}",
                voice.pitch
            )));
        }
        if !(0.0..=1.0).contains(&voice.volume) {
            return Err(AriaError::ConfigError(format!(
                "Voice volume must be between 0 and 1, got {}",
                voice.volume
            )));
        }

        if self.recognition.language.trim().is_empty() {
            return Err(AriaError::ConfigError(
                "Recognition language is required".to_string(),
            ));
        }
        if self.recognition.max_duration_secs <= 0.0 {
            return Err(AriaError::ConfigError(
                "Recognition max duration must be positive".to_string(),
            ));
        }

        if !self.search.base_url.starts_with("http://")
            && !self.search.base_url.starts_with("https://")
        {
            return Err(AriaError::ConfigError(format!(
                "Search URL must be http(s): {}",
                self.search.base_url
            )));
        }

        Ok(())
    }
}
