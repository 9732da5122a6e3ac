//! Capability ports
//!
//! External capabilities the conversation core depends on but does not
//! implement. Real backends live in `speech` and `navigation`; fakes for
//! tests live in `testing`.

use crate::integration::config::{RecognitionConfig, VoiceSettings};
use crate::{AriaError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// One-shot speech-to-text capture
#[async_trait]
pub trait SpeechInputPort: Send + Sync {
    /// Whether capture can work in this environment at all
    fn is_available(&self) -> bool;

    /// Capture a single utterance and return its transcript.
    ///
    /// Resolves once the speaker stops. An empty transcript means nothing
    /// intelligible was heard.
    async fn listen(&self, config: &RecognitionConfig) -> Result<String>;

    /// Abort an in-flight `listen`
    fn cancel(&self);
}

/// Text-to-speech playback
pub trait SpeechOutputPort: Send + Sync {
    /// Whether replies are actually heard
    fn is_available(&self) -> bool {
        true
    }

    /// Queue `text` for playback. Must not block on the audio itself.
    fn speak(&self, text: &str, voice: &VoiceSettings) -> Result<()>;

    /// Stop anything currently playing
    fn cancel(&self) {}
}

/// Opening pages in a new browsing context
pub trait NavigationPort: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}

#[async_trait]
impl<T: SpeechInputPort + ?Sized> SpeechInputPort for Arc<T> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    async fn listen(&self, config: &RecognitionConfig) -> Result<String> {
        (**self).listen(config).await
    }

    fn cancel(&self) {
        (**self).cancel()
    }
}

impl<T: SpeechOutputPort + ?Sized> SpeechOutputPort for Arc<T> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn speak(&self, text: &str, voice: &VoiceSettings) -> Result<()> {
        (**self).speak(text, voice)
    }

    fn cancel(&self) {
        (**self).cancel()
    }
}

impl<T: NavigationPort + ?Sized> NavigationPort for Arc<T> {
    fn open(&self, url: &str) -> Result<()> {
        (**self).open(url)
    }
}

/// Speech input for environments without a recognizer
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableSpeechInput;

#[async_trait]
impl SpeechInputPort for UnavailableSpeechInput {
    fn is_available(&self) -> bool {
        false
    }

    async fn listen(&self, _config: &RecognitionConfig) -> Result<String> {
        Err(AriaError::CaptureUnavailable(
            "no speech recognizer configured".to_string(),
        ))
    }

    fn cancel(&self) {}
}

/// Speech output that only logs, for text-only mode
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSpeechOutput;

impl SpeechOutputPort for SilentSpeechOutput {
    fn is_available(&self) -> bool {
        false
    }

    fn speak(&self, text: &str, _voice: &VoiceSettings) -> Result<()> {
        debug!("Speech output disabled, not speaking: {}", text);
        Ok(())
    }
}
