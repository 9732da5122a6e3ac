use super::delay::ThinkingDelay;
use super::events::{ConversationEvent, EventSink, Notification};
use super::status::{ConversationStatus, StatusCell};
use crate::commands::{CommandInterpreter, Interpretation};
use crate::integration::config::{ConversationConfig, VoiceSettings};
use crate::integration::ports::{NavigationPort, SpeechOutputPort};
use crate::messages::{Message, MessageMetadata, MessageStorage};
use crossbeam_channel::Receiver;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Where an utterance came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOrigin {
    Text,
    Voice,
}

/// Result of a `submit` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input, nothing recorded
    Ignored,
    /// Another turn or a capture was in flight; nothing recorded
    Busy(ConversationStatus),
    /// The turn ran to completion
    Completed(Interpretation),
}

/// Resets the status to idle when a turn ends, even if the turn's future is
/// dropped part way through.
struct TurnGuard<'a> {
    status: &'a StatusCell,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.status
            .transition(ConversationStatus::Processing, ConversationStatus::Idle);
    }
}

/// Owns the message log and status; runs one turn per utterance.
///
/// Cheap to clone: clones share the same log, status and ports.
#[derive(Clone)]
pub struct ConversationController {
    interpreter: CommandInterpreter,
    messages: MessageStorage,
    status: StatusCell,
    events: EventSink,
    delay: ThinkingDelay,
    voice: VoiceSettings,
    speech_output: Arc<dyn SpeechOutputPort>,
    navigation: Arc<dyn NavigationPort>,
}

impl ConversationController {
    /// Create a controller and the receiver for its events
    pub fn new(
        config: &ConversationConfig,
        interpreter: CommandInterpreter,
        speech_output: Arc<dyn SpeechOutputPort>,
        navigation: Arc<dyn NavigationPort>,
    ) -> (Self, Receiver<ConversationEvent>) {
        let (events, event_rx) = EventSink::channel();
        let controller = Self {
            interpreter,
            messages: MessageStorage::new(),
            status: StatusCell::new(events.clone()),
            events,
            delay: config.delay,
            voice: config.voice,
            speech_output,
            navigation,
        };
        (controller, event_rx)
    }

    /// Shared handle to the message log
    pub fn messages(&self) -> MessageStorage {
        self.messages.clone()
    }

    pub fn status(&self) -> ConversationStatus {
        self.status.get()
    }

    /// Shared handle to the status flag
    pub fn status_cell(&self) -> StatusCell {
        self.status.clone()
    }

    /// Publish a user-visible notice
    pub fn notify(&self, notification: Notification) {
        self.events.emit(ConversationEvent::Notification(notification));
    }

    /// Answer a typed utterance
    pub async fn submit(&self, utterance: &str) -> SubmitOutcome {
        self.submit_from(utterance, InputOrigin::Text).await
    }

    /// Run one turn: record the utterance, interpret it, think, record and
    /// speak the reply.
    pub async fn submit_from(&self, utterance: &str, origin: InputOrigin) -> SubmitOutcome {
        if utterance.trim().is_empty() {
            debug!("Ignoring blank utterance");
            return SubmitOutcome::Ignored;
        }

        if !self
            .status
            .transition(ConversationStatus::Idle, ConversationStatus::Processing)
        {
            let current = self.status.get();
            warn!("Rejecting utterance while {}", current);
            return SubmitOutcome::Busy(current);
        }
        let _turn = TurnGuard {
            status: &self.status,
        };
        let started = Instant::now();

        self.append(Message::user(utterance).with_metadata(MessageMetadata {
            is_speech: origin == InputOrigin::Voice,
            command: None,
        }));

        let interpretation = self.interpreter.interpret(utterance);

        if let Some(request) = &interpretation.navigation {
            info!("Searching for \"{}\"", request.query);
            if let Err(e) = self.navigation.open(&request.url) {
                warn!("Failed to open search results: {}", e);
                self.notify(Notification::from_error("Search Error", &e));
            }
        }

        let delay = self.delay.sample();
        if !delay.is_zero() {
            debug!("Thinking for {}ms", delay.as_millis());
            tokio::time::sleep(delay).await;
        }

        self.append(
            Message::assistant(interpretation.reply.clone()).with_metadata(MessageMetadata {
                is_speech: false,
                command: Some(interpretation.kind),
            }),
        );

        if let Err(e) = self.speech_output.speak(&interpretation.reply, &self.voice) {
            warn!("Failed to speak reply: {}", e);
            self.notify(Notification::from_error("Speech Error", &e));
        }

        info!(
            "Answered {:?} in {}ms",
            interpretation.kind,
            started.elapsed().as_millis()
        );

        SubmitOutcome::Completed(interpretation)
    }

    /// Drop the conversation so far. Refused unless idle, so a turn in
    /// flight can never leave an orphaned reply.
    pub fn clear_history(&self) -> bool {
        let cleared = self.status.while_idle(|| self.messages.clear());
        if !cleared {
            warn!("Not clearing history while {}", self.status.get());
            return false;
        }
        self.events.emit(ConversationEvent::HistoryCleared);
        info!("Conversation cleared");
        true
    }

    /// Stop any reply that is still being spoken
    pub fn stop_speaking(&self) {
        self.speech_output.cancel();
    }

    fn append(&self, message: Message) {
        self.messages.add(message.clone());
        self.events.emit(ConversationEvent::MessageAdded(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{replies, CommandKind};
    use crate::conversation::events::NotificationLevel;
    use crate::integration::testing::{RecordingNavigator, RecordingSpeechOutput};
    use crate::messages::Sender;
    use std::time::Duration;

    struct Fixture {
        controller: ConversationController,
        events: Receiver<ConversationEvent>,
        speech: Arc<RecordingSpeechOutput>,
        navigator: Arc<RecordingNavigator>,
    }

    fn fixture_with(
        delay: ThinkingDelay,
        speech: RecordingSpeechOutput,
        navigator: RecordingNavigator,
    ) -> Fixture {
        let speech = Arc::new(speech);
        let navigator = Arc::new(navigator);
        let config = ConversationConfig {
            delay,
            voice: VoiceSettings::default(),
        };
        let (controller, events) = ConversationController::new(
            &config,
            CommandInterpreter::default(),
            speech.clone(),
            navigator.clone(),
        );
        Fixture {
            controller,
            events,
            speech,
            navigator,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(
            ThinkingDelay::none(),
            RecordingSpeechOutput::new(),
            RecordingNavigator::new(),
        )
    }

    fn statuses(events: &Receiver<ConversationEvent>) -> Vec<ConversationStatus> {
        events
            .try_iter()
            .filter_map(|event| match event {
                ConversationEvent::StatusChanged(status) => Some(status),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let f = fixture();
        assert_eq!(f.controller.submit("").await, SubmitOutcome::Ignored);
        assert_eq!(f.controller.submit("   ").await, SubmitOutcome::Ignored);
        assert!(f.controller.messages().is_empty());
        assert!(f.events.try_recv().is_err());
        assert!(f.speech.spoken().is_empty());
    }

    #[tokio::test]
    async fn test_turn_appends_user_then_assistant() {
        let f = fixture();
        let outcome = f.controller.submit("Hello there").await;
        assert!(matches!(outcome, SubmitOutcome::Completed(_)));

        let log = f.controller.messages().get_all();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].sender, Sender::User);
        assert_eq!(log[0].text, "Hello there");
        assert!(!log[0].metadata.is_speech);
        assert_eq!(log[1].sender, Sender::Assistant);
        assert_eq!(log[1].text, replies::GREETING);
        assert_eq!(log[1].metadata.command, Some(CommandKind::Greeting));
    }

    #[tokio::test]
    async fn test_raw_utterance_is_recorded() {
        let f = fixture();
        f.controller.submit("  weather?  ").await;
        assert_eq!(f.controller.messages().get_all()[0].text, "  weather?  ");
    }

    #[tokio::test]
    async fn test_status_sequence() {
        let f = fixture();
        assert_eq!(f.controller.status(), ConversationStatus::Idle);
        f.controller.submit("asdkfj").await;
        assert_eq!(
            statuses(&f.events),
            vec![ConversationStatus::Processing, ConversationStatus::Idle]
        );
        assert_eq!(f.controller.status(), ConversationStatus::Idle);
    }

    #[tokio::test]
    async fn test_reply_is_spoken_with_voice_settings() {
        let f = fixture();
        f.controller.submit("Shut down now").await;
        assert_eq!(f.speech.spoken(), vec![replies::SHUTDOWN_REFUSAL.to_string()]);
        let voice = f.speech.last_voice().unwrap();
        assert_eq!(voice.rate, 0.9);
        assert_eq!(voice.pitch, 1.1);
        assert_eq!(voice.volume, 0.8);
    }

    #[tokio::test]
    async fn test_search_navigates_once() {
        let f = fixture();
        f.controller.submit("Search Google for pizza places").await;
        assert_eq!(
            f.navigator.opened(),
            vec!["https://www.google.com/search?q=pizza%20places".to_string()]
        );

        f.controller.submit("hello").await;
        f.controller.submit("search google for").await;
        assert_eq!(f.navigator.opened().len(), 1);
    }

    #[tokio::test]
    async fn test_speech_failure_still_completes_turn() {
        let f = fixture_with(
            ThinkingDelay::none(),
            RecordingSpeechOutput::failing(),
            RecordingNavigator::new(),
        );
        let outcome = f.controller.submit("hi").await;
        assert!(matches!(outcome, SubmitOutcome::Completed(_)));
        assert_eq!(f.controller.messages().len(), 2);
        assert_eq!(f.controller.status(), ConversationStatus::Idle);

        let notices: Vec<_> = f
            .events
            .try_iter()
            .filter_map(|event| match event {
                ConversationEvent::Notification(n) => Some(n),
                _ => None,
            })
            .collect();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NotificationLevel::Error);
    }

    #[tokio::test]
    async fn test_navigation_failure_still_completes_turn() {
        let f = fixture_with(
            ThinkingDelay::none(),
            RecordingSpeechOutput::new(),
            RecordingNavigator::failing(),
        );
        let outcome = f.controller.submit("search google for otters").await;
        assert!(matches!(outcome, SubmitOutcome::Completed(_)));
        assert_eq!(f.speech.spoken(), vec![replies::WEB_SEARCH.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_submit_is_rejected() {
        let f = fixture_with(
            ThinkingDelay::fixed(Duration::from_millis(1000)),
            RecordingSpeechOutput::new(),
            RecordingNavigator::new(),
        );

        let first = {
            let controller = f.controller.clone();
            tokio::spawn(async move { controller.submit("what time is it").await })
        };
        tokio::task::yield_now().await;
        assert_eq!(f.controller.status(), ConversationStatus::Processing);

        let second = f.controller.submit("hello").await;
        assert_eq!(second, SubmitOutcome::Busy(ConversationStatus::Processing));

        let first = first.await.unwrap();
        assert!(matches!(first, SubmitOutcome::Completed(_)));
        assert_eq!(f.controller.messages().len(), 2);
        assert_eq!(f.speech.spoken().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_waits_for_delay() {
        let f = fixture_with(
            ThinkingDelay::fixed(Duration::from_millis(1000)),
            RecordingSpeechOutput::new(),
            RecordingNavigator::new(),
        );

        let turn = {
            let controller = f.controller.clone();
            tokio::spawn(async move { controller.submit("weather").await })
        };
        tokio::task::yield_now().await;
        assert_eq!(f.controller.messages().len(), 1);

        tokio::time::advance(Duration::from_millis(1001)).await;
        turn.await.unwrap();
        assert_eq!(f.controller.messages().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_turn_returns_to_idle() {
        let f = fixture_with(
            ThinkingDelay::fixed(Duration::from_millis(5000)),
            RecordingSpeechOutput::new(),
            RecordingNavigator::new(),
        );

        let turn = {
            let controller = f.controller.clone();
            tokio::spawn(async move { controller.submit("weather").await })
        };
        tokio::task::yield_now().await;
        assert_eq!(f.controller.status(), ConversationStatus::Processing);

        turn.abort();
        let _ = turn.await;
        assert_eq!(f.controller.status(), ConversationStatus::Idle);
    }

    #[tokio::test]
    async fn test_clear_history() {
        let f = fixture();
        f.controller.submit("hello").await;
        assert!(f.controller.clear_history());
        assert!(f.controller.messages().is_empty());
        assert!(f
            .events
            .try_iter()
            .any(|event| matches!(event, ConversationEvent::HistoryCleared)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_refused_mid_turn() {
        let f = fixture_with(
            ThinkingDelay::fixed(Duration::from_millis(1000)),
            RecordingSpeechOutput::new(),
            RecordingNavigator::new(),
        );

        let turn = {
            let controller = f.controller.clone();
            tokio::spawn(async move { controller.submit("hello").await })
        };
        tokio::task::yield_now().await;
        assert_eq!(f.controller.messages().len(), 1);

        assert!(!f.controller.clear_history());
        assert_eq!(f.controller.messages().len(), 1);

        tokio::time::advance(Duration::from_millis(1001)).await;
        turn.await.unwrap();

        let log = f.controller.messages().get_all();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].sender, Sender::User);
        assert_eq!(log[0].text, "hello");
        assert_eq!(log[1].sender, Sender::Assistant);
        assert_eq!(log[1].text, replies::GREETING);
        assert!(!f
            .events
            .try_iter()
            .any(|event| matches!(event, ConversationEvent::HistoryCleared)));
    }

    #[tokio::test]
    async fn test_voice_origin_is_recorded() {
        let f = fixture();
        f.controller.submit_from("hello", InputOrigin::Voice).await;
        assert!(f.controller.messages().get_all()[0].metadata.is_speech);
    }
}
