//! Voice capture adapter
//!
//! Drives a one-shot speech-to-text port and feeds the transcript into the
//! conversation controller. Status runs `idle -> listening -> idle` and, when
//! something was heard, continues into a normal turn.

use crate::conversation::{
    ConversationController, ConversationStatus, InputOrigin, Notification, StatusCell,
};
use crate::integration::config::RecognitionConfig;
use crate::integration::ports::SpeechInputPort;
use crate::{AriaError, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Result of asking the adapter to start listening
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A capture was already running; nothing changed
    AlreadyListening,
    /// A turn is being answered; capture was not started
    Busy,
}

pub struct VoiceCapture {
    input: Arc<dyn SpeechInputPort>,
    controller: ConversationController,
    status: StatusCell,
    config: RecognitionConfig,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl VoiceCapture {
    pub fn new(
        input: Arc<dyn SpeechInputPort>,
        controller: ConversationController,
        config: RecognitionConfig,
    ) -> Self {
        Self {
            status: controller.status_cell(),
            input,
            controller,
            config,
            task: Mutex::new(None),
        }
    }

    /// Whether the UI should offer voice capture at all
    pub fn is_available(&self) -> bool {
        self.input.is_available()
    }

    /// Begin a one-shot capture.
    ///
    /// Must be called from within a tokio runtime; the capture runs as a
    /// spawned task and this returns immediately.
    pub fn start(&self) -> Result<StartOutcome> {
        if !self.is_available() {
            return Err(AriaError::CaptureUnavailable(
                "speech recognition is not supported here".to_string(),
            ));
        }

        if !self
            .status
            .transition(ConversationStatus::Idle, ConversationStatus::Listening)
        {
            return Ok(match self.status.get() {
                ConversationStatus::Listening => StartOutcome::AlreadyListening,
                _ => StartOutcome::Busy,
            });
        }

        info!("Listening ({})", self.config.language);

        let input = Arc::clone(&self.input);
        let controller = self.controller.clone();
        let status = self.status.clone();
        let config = self.config.clone();

        let handle = tokio::spawn(async move {
            let result = input.listen(&config).await;

            // A concurrent stop() already reset the status; drop the result
            if !status.transition(ConversationStatus::Listening, ConversationStatus::Idle) {
                debug!("Capture finished after being stopped");
                return;
            }

            match result {
                Ok(transcript) if transcript.trim().is_empty() => {
                    debug!("Capture ended without speech");
                }
                Ok(transcript) => {
                    debug!("Transcript: {}", transcript);
                    controller.submit_from(&transcript, InputOrigin::Voice).await;
                }
                Err(e) => {
                    warn!("Speech recognition error: {}", e);
                    controller.notify(Notification::capture_failed());
                }
            }
        });

        *self.task.lock() = Some(handle);
        Ok(StartOutcome::Started)
    }

    /// Cancel a running capture. Does nothing once the transcript has been
    /// handed to the controller.
    pub fn stop(&self) {
        if !self
            .status
            .transition(ConversationStatus::Listening, ConversationStatus::Idle)
        {
            return;
        }

        self.input.cancel();
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
        }
        info!("Listening stopped");
    }

    /// Start when idle, stop when listening
    pub fn toggle(&self) -> Result<StartOutcome> {
        if self.status.get().is_listening() {
            self.stop();
            return Ok(StartOutcome::AlreadyListening);
        }
        self.start()
    }
}

impl Drop for VoiceCapture {
    fn drop(&mut self) {
        self.stop();
    }
}
