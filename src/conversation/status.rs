use super::events::{ConversationEvent, EventSink};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// The controller's current phase. Exactly one is active at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConversationStatus {
    #[default]
    Idle,
    /// Voice capture is running
    Listening,
    /// A turn is being answered
    Processing,
}

impl ConversationStatus {
    pub fn is_idle(&self) -> bool {
        matches!(self, ConversationStatus::Idle)
    }

    pub fn is_listening(&self) -> bool {
        matches!(self, ConversationStatus::Listening)
    }

    pub fn is_processing(&self) -> bool {
        matches!(self, ConversationStatus::Processing)
    }

    /// Status badge text
    pub fn label(&self) -> &'static str {
        match self {
            ConversationStatus::Idle => "Ready",
            ConversationStatus::Listening => "Listening...",
            ConversationStatus::Processing => "Processing...",
        }
    }
}

impl std::fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversationStatus::Idle => write!(f, "Idle"),
            ConversationStatus::Listening => write!(f, "Listening"),
            ConversationStatus::Processing => write!(f, "Processing"),
        }
    }
}

/// Shared status flag that publishes every change
#[derive(Clone, Debug)]
pub struct StatusCell {
    status: Arc<Mutex<ConversationStatus>>,
    events: EventSink,
}

impl StatusCell {
    pub fn new(events: EventSink) -> Self {
        Self {
            status: Arc::new(Mutex::new(ConversationStatus::Idle)),
            events,
        }
    }

    pub fn get(&self) -> ConversationStatus {
        *self.status.lock()
    }

    /// Move from `from` to `to`. Returns false, changing nothing, when the
    /// current status is not `from`.
    pub fn transition(&self, from: ConversationStatus, to: ConversationStatus) -> bool {
        {
            let mut status = self.status.lock();
            if *status != from {
                return false;
            }
            *status = to;
        }
        self.publish(from, to);
        true
    }

    /// Run `f` only while idle. The status stays locked for the duration,
    /// so no turn or capture can start underneath it.
    pub fn while_idle(&self, f: impl FnOnce()) -> bool {
        let status = self.status.lock();
        if *status != ConversationStatus::Idle {
            return false;
        }
        f();
        true
    }

    /// Unconditionally set the status
    pub fn set(&self, to: ConversationStatus) {
        let from = std::mem::replace(&mut *self.status.lock(), to);
        if from != to {
            self.publish(from, to);
        }
    }

    fn publish(&self, from: ConversationStatus, to: ConversationStatus) {
        debug!("Status {} -> {}", from, to);
        self.events.emit(ConversationEvent::StatusChanged(to));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(ConversationStatus::Idle.label(), "Ready");
        assert_eq!(ConversationStatus::Listening.label(), "Listening...");
        assert_eq!(ConversationStatus::Processing.label(), "Processing...");
    }

    #[test]
    fn test_transition_requires_expected_state() {
        let (sink, rx) = EventSink::channel();
        let cell = StatusCell::new(sink);

        assert!(!cell.transition(ConversationStatus::Listening, ConversationStatus::Idle));
        assert!(cell.transition(ConversationStatus::Idle, ConversationStatus::Processing));
        assert!(!cell.transition(ConversationStatus::Idle, ConversationStatus::Listening));
        assert_eq!(cell.get(), ConversationStatus::Processing);

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            ConversationEvent::StatusChanged(ConversationStatus::Processing)
        ));
    }

    #[test]
    fn test_set_same_status_is_silent() {
        let (sink, rx) = EventSink::channel();
        let cell = StatusCell::new(sink);
        cell.set(ConversationStatus::Idle);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_while_idle_runs_only_when_idle() {
        let (sink, _rx) = EventSink::channel();
        let cell = StatusCell::new(sink);

        let mut ran = false;
        assert!(cell.while_idle(|| ran = true));
        assert!(ran);

        cell.set(ConversationStatus::Processing);
        let mut ran = false;
        assert!(!cell.while_idle(|| ran = true));
        assert!(!ran);
    }
}
