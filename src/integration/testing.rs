//! Fake capability ports
//!
//! In-memory implementations that record what the conversation core asked
//! for, so tests can run without audio devices or a browser.

use crate::integration::config::{RecognitionConfig, VoiceSettings};
use crate::integration::ports::{NavigationPort, SpeechInputPort, SpeechOutputPort};
use crate::{AriaError, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Scripted outcome of one `listen` call
#[derive(Debug, Clone)]
pub enum ScriptedCapture {
    Transcript(String),
    Failure(String),
    /// Never resolves until cancelled
    Hang,
}

/// Speech input that replays scripted results
pub struct ScriptedSpeechInput {
    script: Mutex<VecDeque<ScriptedCapture>>,
    available: AtomicBool,
    cancelled: Notify,
    cancel_count: AtomicUsize,
    /// Configs passed to each `listen`
    pub requests: Mutex<Vec<RecognitionConfig>>,
}

impl ScriptedSpeechInput {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            available: AtomicBool::new(true),
            cancelled: Notify::new(),
            cancel_count: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        let input = Self::new();
        input.available.store(false, Ordering::SeqCst);
        input
    }

    pub fn push_transcript(&self, text: impl Into<String>) {
        self.script
            .lock()
            .push_back(ScriptedCapture::Transcript(text.into()));
    }

    pub fn push_failure(&self, error: impl Into<String>) {
        self.script
            .lock()
            .push_back(ScriptedCapture::Failure(error.into()));
    }

    pub fn push_hang(&self) {
        self.script.lock().push_back(ScriptedCapture::Hang);
    }

    pub fn cancel_count(&self) -> usize {
        self.cancel_count.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedSpeechInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechInputPort for ScriptedSpeechInput {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn listen(&self, config: &RecognitionConfig) -> Result<String> {
        self.requests.lock().push(config.clone());

        let next = self.script.lock().pop_front();
        match next {
            Some(ScriptedCapture::Transcript(text)) => Ok(text),
            Some(ScriptedCapture::Failure(error)) => Err(AriaError::CaptureFailure(error)),
            Some(ScriptedCapture::Hang) => {
                self.cancelled.notified().await;
                Err(AriaError::CaptureFailure("aborted".to_string()))
            }
            None => Err(AriaError::CaptureFailure("no-speech".to_string())),
        }
    }

    fn cancel(&self) {
        self.cancel_count.fetch_add(1, Ordering::SeqCst);
        self.cancelled.notify_one();
    }
}

/// Speech output that records what it was asked to say
#[derive(Default)]
pub struct RecordingSpeechOutput {
    spoken: Mutex<Vec<(String, VoiceSettings)>>,
    fail: AtomicBool,
}

impl RecordingSpeechOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subsequent `speak` fails
    pub fn failing() -> Self {
        let output = Self::default();
        output.fail.store(true, Ordering::SeqCst);
        output
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().iter().map(|(text, _)| text.clone()).collect()
    }

    pub fn last_voice(&self) -> Option<VoiceSettings> {
        self.spoken.lock().last().map(|(_, voice)| *voice)
    }
}

impl SpeechOutputPort for RecordingSpeechOutput {
    fn speak(&self, text: &str, voice: &VoiceSettings) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AriaError::SpeechOutputError("synthesizer offline".to_string()));
        }
        self.spoken.lock().push((text.to_string(), *voice));
        Ok(())
    }
}

/// Navigation that records URLs instead of opening them
#[derive(Default)]
pub struct RecordingNavigator {
    opened: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let navigator = Self::default();
        navigator.fail.store(true, Ordering::SeqCst);
        navigator
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().clone()
    }
}

impl NavigationPort for RecordingNavigator {
    fn open(&self, url: &str) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AriaError::NavigationError("no browser".to_string()));
        }
        self.opened.lock().push(url.to_string());
        Ok(())
    }
}
