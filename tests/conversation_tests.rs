//! End-to-end tests for the Aria assistant
//!
//! These run the orchestrator on its own thread with fake capability ports
//! and drive it through the public handle, the same way the UI does.

use aria::commands::{replies, CommandKind};
use aria::conversation::{ConversationEvent, ConversationStatus, ThinkingDelay};
use aria::integration::testing::{RecordingNavigator, RecordingSpeechOutput, ScriptedSpeechInput};
use aria::integration::{
    AssistantConfig, OrchestratorBuilder, OrchestratorCommand, OrchestratorHandle,
};
use aria::messages::Sender;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

const TIMEOUT: Duration = Duration::from_secs(5);

struct Assistant {
    handle: OrchestratorHandle,
    worker: Option<JoinHandle<()>>,
    input: Arc<ScriptedSpeechInput>,
    speech: Arc<RecordingSpeechOutput>,
    navigator: Arc<RecordingNavigator>,
}

impl Assistant {
    fn start() -> Self {
        Self::start_with(AssistantConfig::default().with_delay(ThinkingDelay::none()))
    }

    fn start_with(config: AssistantConfig) -> Self {
        let input = Arc::new(ScriptedSpeechInput::new());
        let speech = Arc::new(RecordingSpeechOutput::new());
        let navigator = Arc::new(RecordingNavigator::new());

        let (orchestrator, handle) = OrchestratorBuilder::new()
            .with_config(config)
            .with_speech_input(input.clone())
            .with_speech_output(speech.clone())
            .with_navigation(navigator.clone())
            .build()
            .expect("orchestrator should build");
        let worker = orchestrator.start().expect("orchestrator should start");

        Self {
            handle,
            worker: Some(worker),
            input,
            speech,
            navigator,
        }
    }

    fn send(&self, cmd: OrchestratorCommand) {
        self.handle.send_command(cmd).expect("orchestrator is running");
    }

    fn say(&self, text: &str) {
        self.send(OrchestratorCommand::SendText(text.to_string()));
    }

    /// Wait until the log holds `count` messages
    fn wait_for_messages(&self, count: usize) {
        let deadline = Instant::now() + TIMEOUT;
        while self.handle.messages().len() < count {
            assert!(
                Instant::now() < deadline,
                "timed out waiting for {} messages",
                count
            );
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    fn wait_for_status(&self, status: ConversationStatus) {
        let deadline = Instant::now() + TIMEOUT;
        while self.handle.status() != status {
            assert!(Instant::now() < deadline, "timed out waiting for {}", status);
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    /// Answer one typed message and return the reply text
    fn ask(&self, text: &str) -> String {
        let before = self.handle.messages().len();
        self.say(text);
        self.wait_for_messages(before + 2);
        self.wait_for_status(ConversationStatus::Idle);
        self.handle.messages().get_all()[before + 1].text.clone()
    }

    fn status_changes(&self) -> Vec<ConversationStatus> {
        let mut statuses = Vec::new();
        while let Some(event) = self.handle.try_recv_event() {
            if let ConversationEvent::StatusChanged(status) = event {
                statuses.push(status);
            }
        }
        statuses
    }
}

impl Drop for Assistant {
    fn drop(&mut self) {
        let _ = self.handle.send_command(OrchestratorCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[test]
fn test_turn_appends_user_then_assistant() {
    let assistant = Assistant::start();

    let reply = assistant.ask("Play my favorite song on Spotify");
    assert_eq!(reply, replies::PLAY_MUSIC);

    let messages = assistant.handle.messages().get_all();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, Sender::User);
    assert_eq!(messages[0].text, "Play my favorite song on Spotify");
    assert_eq!(messages[1].sender, Sender::Assistant);
    assert_eq!(messages[1].metadata.command, Some(CommandKind::PlayMusic));

    assert_eq!(assistant.speech.spoken(), vec![replies::PLAY_MUSIC.to_string()]);
}

#[test]
fn test_typed_status_sequence() {
    let assistant = Assistant::start();
    assistant.ask("hello");

    assert_eq!(
        assistant.status_changes(),
        vec![ConversationStatus::Processing, ConversationStatus::Idle]
    );
}

#[test]
fn test_blank_input_leaves_log_unchanged() {
    let assistant = Assistant::start();

    assistant.say("");
    assistant.say("   ");
    // A real turn afterwards proves the blank ones were already handled
    assistant.ask("asdkfj");

    let messages = assistant.handle.messages().get_all();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].text, "asdkfj");
    assert_eq!(messages[1].text, replies::FALLBACK);
}

#[test]
fn test_scenario_replies() {
    let assistant = Assistant::start();

    let reply = assistant.ask("What time is it?");
    assert!(reply.starts_with("The current time is "), "{}", reply);
    assert!(reply.contains("AM") || reply.contains("PM"), "{}", reply);

    assert_eq!(assistant.ask("Shut down now"), replies::SHUTDOWN_REFUSAL);
    assert_eq!(assistant.ask("asdkfj"), replies::FALLBACK);

    assert!(assistant.navigator.opened().is_empty());
}

#[test]
fn test_search_opens_results_page() {
    let assistant = Assistant::start();

    assert_eq!(
        assistant.ask("Search Google for pizza places"),
        replies::WEB_SEARCH
    );
    assert_eq!(
        assistant.navigator.opened(),
        vec!["https://www.google.com/search?q=pizza%20places".to_string()]
    );

    // Nothing left after stripping the phrase
    assistant.ask("search google for");
    assert_eq!(assistant.navigator.opened().len(), 1);
}

#[test]
fn test_voice_turn_status_sequence() {
    let assistant = Assistant::start();
    assistant.input.push_transcript("What's the weather like?");

    assistant.send(OrchestratorCommand::StartListening);
    assistant.wait_for_messages(2);
    assistant.wait_for_status(ConversationStatus::Idle);

    assert_eq!(
        assistant.status_changes(),
        vec![
            ConversationStatus::Listening,
            ConversationStatus::Idle,
            ConversationStatus::Processing,
            ConversationStatus::Idle,
        ]
    );

    let messages = assistant.handle.messages().get_all();
    assert!(messages[0].metadata.is_speech);
    assert_eq!(messages[1].text, replies::WEATHER);
}

#[test]
fn test_capture_failure_notifies_and_returns_to_idle() {
    let assistant = Assistant::start();
    assistant.input.push_failure("network");

    assistant.send(OrchestratorCommand::StartListening);

    let deadline = Instant::now() + TIMEOUT;
    let notification = loop {
        if let Some(ConversationEvent::Notification(n)) = assistant.handle.try_recv_event() {
            break n;
        }
        assert!(Instant::now() < deadline, "no notification");
        std::thread::sleep(Duration::from_millis(5));
    };

    assert_eq!(notification.title, "Speech Recognition Error");
    assistant.wait_for_status(ConversationStatus::Idle);
    assert!(assistant.handle.messages().is_empty());
}

#[test]
fn test_stop_listening_cancels_capture() {
    let assistant = Assistant::start();
    assistant.input.push_hang();

    assistant.send(OrchestratorCommand::StartListening);
    assistant.wait_for_status(ConversationStatus::Listening);

    assistant.send(OrchestratorCommand::StopListening);
    assistant.wait_for_status(ConversationStatus::Idle);

    assert!(assistant.input.cancel_count() >= 1);
    assert!(assistant.handle.messages().is_empty());
}

#[test]
fn test_message_while_processing_is_rejected() {
    let config = AssistantConfig::default().with_delay(ThinkingDelay::fixed(Duration::from_millis(300)));
    let assistant = Assistant::start_with(config);

    assistant.say("hello");
    assistant.wait_for_status(ConversationStatus::Processing);
    assistant.say("what's the weather");

    assistant.wait_for_messages(2);
    assistant.wait_for_status(ConversationStatus::Idle);

    let messages = assistant.handle.messages().get_all();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].text, "hello");
    assert_eq!(messages[1].text, replies::GREETING);
}

#[test]
fn test_clear_history() {
    let assistant = Assistant::start();
    assistant.ask("hello");

    assistant.send(OrchestratorCommand::ClearHistory);

    let deadline = Instant::now() + TIMEOUT;
    while !assistant.handle.messages().is_empty() {
        assert!(Instant::now() < deadline, "history was not cleared");
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn test_unavailable_voice_input() {
    let (orchestrator, handle) = OrchestratorBuilder::new()
        .with_speech_input(Arc::new(ScriptedSpeechInput::unavailable()))
        .with_speech_output(Arc::new(RecordingSpeechOutput::new()))
        .with_navigation(Arc::new(RecordingNavigator::new()))
        .build()
        .unwrap();
    let worker = orchestrator.start().unwrap();

    assert!(!handle.is_voice_available());

    handle.send_command(OrchestratorCommand::StartListening).unwrap();

    let deadline = Instant::now() + TIMEOUT;
    let notification = loop {
        if let Some(ConversationEvent::Notification(n)) = handle.try_recv_event() {
            break n;
        }
        assert!(Instant::now() < deadline, "no notification");
        std::thread::sleep(Duration::from_millis(5));
    };
    assert_eq!(notification.title, "Voice Input");
    assert_eq!(handle.status(), ConversationStatus::Idle);

    handle.send_command(OrchestratorCommand::Shutdown).unwrap();
    worker.join().unwrap();
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = AssistantConfig::default().with_delay(ThinkingDelay::Random {
        min_ms: 3000,
        max_ms: 1000,
    });
    assert!(OrchestratorBuilder::new().with_config(config).build().is_err());
}
