use crate::messages::Message;
use crate::AriaError;
use crossbeam_channel::{unbounded, Receiver, Sender};
use super::status::ConversationStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// A transient, user-visible notice (rendered as a toast)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            level: NotificationLevel::Info,
        }
    }

    /// Notice shown when a voice capture attempt fails
    pub fn capture_failed() -> Self {
        Self::error(
            "Speech Recognition Error",
            "Could not process voice input. Please try again.",
        )
    }

    /// Notice for a recoverable backend error
    pub fn from_error(title: impl Into<String>, error: &AriaError) -> Self {
        Self::error(title, error.user_message())
    }
}

/// Events published by the conversation core for the presentation layer
#[derive(Debug, Clone)]
pub enum ConversationEvent {
    StatusChanged(ConversationStatus),
    MessageAdded(Message),
    Notification(Notification),
    HistoryCleared,
}

/// Fire-and-forget event publisher. Events are dropped if nobody listens.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Sender<ConversationEvent>,
}

impl EventSink {
    pub fn new(tx: Sender<ConversationEvent>) -> Self {
        Self { tx }
    }

    /// A sink plus the receiving end
    pub fn channel() -> (Self, Receiver<ConversationEvent>) {
        let (tx, rx) = unbounded();
        (Self::new(tx), rx)
    }

    pub fn emit(&self, event: ConversationEvent) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_receiver_does_not_panic() {
        let (sink, rx) = EventSink::channel();
        drop(rx);
        sink.emit(ConversationEvent::HistoryCleared);
    }

    #[test]
    fn test_capture_failed_notice() {
        let notice = Notification::capture_failed();
        assert_eq!(notice.level, NotificationLevel::Error);
        assert_eq!(notice.title, "Speech Recognition Error");
    }
}
