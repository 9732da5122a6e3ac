//! Application state management
//!
//! The UI keeps no conversation state of its own: messages and status are
//! read from the orchestrator's shared handles, and user actions become
//! orchestrator commands.

use crate::avatar::{AvatarDriver, AvatarFrame};
use crate::conversation::{ConversationEvent, ConversationStatus, Notification};
use crate::integration::{OrchestratorCommand, OrchestratorHandle};
use crate::messages::MessageStorage;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How long a toast stays on screen
pub const TOAST_LIFETIME: Duration = Duration::from_secs(4);

/// At most this many toasts are shown at once
const MAX_TOASTS: usize = 4;

#[derive(Debug, Clone)]
pub struct Toast {
    pub notification: Notification,
    pub shown_at: Instant,
}

impl Toast {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) >= TOAST_LIFETIME
    }
}

/// Central application state
pub struct AppState {
    /// Shared view of the conversation log
    pub messages: MessageStorage,

    /// Current text input
    pub input_text: String,

    /// Whether the mic button is offered
    pub voice_available: bool,

    /// Whether replies are spoken
    pub audio_available: bool,

    /// Active notifications, oldest first
    pub toasts: VecDeque<Toast>,

    avatar: AvatarDriver,
    started: Instant,
    orchestrator: OrchestratorHandle,
}

impl AppState {
    pub fn new(orchestrator: OrchestratorHandle) -> Self {
        Self {
            messages: orchestrator.messages(),
            input_text: String::new(),
            voice_available: orchestrator.is_voice_available(),
            audio_available: orchestrator.is_audio_available(),
            toasts: VecDeque::new(),
            avatar: AvatarDriver::new(),
            started: Instant::now(),
            orchestrator,
        }
    }

    pub fn status(&self) -> ConversationStatus {
        self.orchestrator.status()
    }

    /// Drain orchestrator events and expire old toasts
    pub fn poll_events(&mut self) {
        while let Some(event) = self.orchestrator.try_recv_event() {
            match event {
                ConversationEvent::Notification(notification) => self.push_toast(notification),
                ConversationEvent::StatusChanged(status) => debug!("Status: {}", status),
                ConversationEvent::MessageAdded(_) | ConversationEvent::HistoryCleared => {}
            }
        }

        let now = Instant::now();
        self.toasts.retain(|toast| !toast.is_expired(now));
    }

    pub fn push_toast(&mut self, notification: Notification) {
        if self.toasts.len() >= MAX_TOASTS {
            self.toasts.pop_front();
        }
        self.toasts.push_back(Toast {
            notification,
            shown_at: Instant::now(),
        });
    }

    /// Whether the input box may be submitted right now
    pub fn can_send(&self) -> bool {
        !self.input_text.trim().is_empty() && self.status().is_idle()
    }

    /// Submit the current input
    pub fn send_message(&mut self) {
        if !self.can_send() {
            return;
        }

        let text = std::mem::take(&mut self.input_text);
        self.send(OrchestratorCommand::SendText(text));
    }

    /// Start listening when idle, stop when already listening
    pub fn toggle_listening(&mut self) {
        match self.status() {
            ConversationStatus::Listening => self.send(OrchestratorCommand::StopListening),
            ConversationStatus::Idle if self.voice_available => {
                self.send(OrchestratorCommand::StartListening)
            }
            _ => {}
        }
    }

    /// Clearing is only offered between turns
    pub fn can_clear(&self) -> bool {
        !self.messages.is_empty() && self.status().is_idle()
    }

    pub fn clear_conversation(&mut self) {
        self.send(OrchestratorCommand::ClearHistory);
    }

    pub fn shutdown(&mut self) {
        self.send(OrchestratorCommand::Shutdown);
    }

    /// Avatar frame for the current status and wall time
    pub fn avatar_frame(&mut self) -> AvatarFrame {
        let status = self.status();
        self.avatar
            .frame(status, self.started.elapsed().as_secs_f64())
    }

    fn send(&mut self, cmd: OrchestratorCommand) {
        if let Err(e) = self.orchestrator.send_command(cmd) {
            warn!("{}", e);
            self.push_toast(Notification::from_error("Assistant Unavailable", &e));
        }
    }
}
