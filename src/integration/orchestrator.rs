//! Orchestrator for the assistant runtime
//!
//! Owns the conversation controller and voice capture on a dedicated thread
//! with a single-threaded tokio runtime. The UI talks to it through an
//! [`OrchestratorHandle`]: commands in, conversation events out.

use crate::capture::{StartOutcome, VoiceCapture};
use crate::commands::CommandInterpreter;
use crate::conversation::{
    ConversationController, ConversationEvent, ConversationStatus, Notification, StatusCell,
    SubmitOutcome,
};
use crate::integration::config::AssistantConfig;
use crate::integration::navigation::SystemBrowser;
use crate::integration::ports::{
    NavigationPort, SilentSpeechOutput, SpeechInputPort, SpeechOutputPort, UnavailableSpeechInput,
};
use crate::messages::MessageStorage;
use crate::{AriaError, Result};
use crossbeam_channel::Receiver;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

/// Commands that can be sent to the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorCommand {
    /// Answer a typed message
    SendText(String),

    /// Begin a one-shot voice capture
    StartListening,

    /// Cancel a running voice capture
    StopListening,

    /// Clear conversation history
    ClearHistory,

    /// Shutdown the orchestrator
    Shutdown,
}

/// Handle for controlling the orchestrator from the UI
#[derive(Clone)]
pub struct OrchestratorHandle {
    command_tx: UnboundedSender<OrchestratorCommand>,
    event_rx: Receiver<ConversationEvent>,
    messages: MessageStorage,
    status: StatusCell,
    voice_available: bool,
    audio_available: bool,
}

impl OrchestratorHandle {
    /// Send a command to the orchestrator
    pub fn send_command(&self, cmd: OrchestratorCommand) -> Result<()> {
        self.command_tx
            .send(cmd)
            .map_err(|e| AriaError::ChannelError(format!("Failed to send command: {}", e)))
    }

    /// Try to receive an event from the orchestrator
    pub fn try_recv_event(&self) -> Option<ConversationEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Shared view of the message log
    pub fn messages(&self) -> MessageStorage {
        self.messages.clone()
    }

    pub fn status(&self) -> ConversationStatus {
        self.status.get()
    }

    /// Whether voice capture can be offered
    pub fn is_voice_available(&self) -> bool {
        self.voice_available
    }

    /// Whether replies are spoken aloud
    pub fn is_audio_available(&self) -> bool {
        self.audio_available
    }
}

/// Main orchestrator that coordinates the conversation and its ports
pub struct Orchestrator {
    controller: ConversationController,
    capture: VoiceCapture,
    command_rx: UnboundedReceiver<OrchestratorCommand>,
}

impl Orchestrator {
    /// Create an orchestrator with explicit ports
    pub fn new(
        config: AssistantConfig,
        speech_input: Arc<dyn SpeechInputPort>,
        speech_output: Arc<dyn SpeechOutputPort>,
        navigation: Arc<dyn NavigationPort>,
    ) -> Result<(Self, OrchestratorHandle)> {
        config.validate()?;

        let (command_tx, command_rx) = unbounded_channel();
        let audio_available = speech_output.is_available();
        let (controller, event_rx) = ConversationController::new(
            &config.conversation,
            CommandInterpreter::new(config.search.clone()),
            speech_output,
            navigation,
        );
        let capture = VoiceCapture::new(
            speech_input,
            controller.clone(),
            config.recognition.clone(),
        );

        let handle = OrchestratorHandle {
            command_tx,
            event_rx,
            messages: controller.messages(),
            status: controller.status_cell(),
            voice_available: capture.is_available(),
            audio_available,
        };

        let orchestrator = Self {
            controller,
            capture,
            command_rx,
        };

        Ok((orchestrator, handle))
    }

    #[cfg(test)]
    pub(crate) fn status_cell(&self) -> StatusCell {
        self.controller.status_cell()
    }

    /// Start the orchestrator on its own thread
    ///
    /// This consumes the orchestrator and returns the worker's join handle.
    pub fn start(self) -> Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("aria-orchestrator".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        error!("Failed to create orchestrator runtime: {}", e);
                        return;
                    }
                };
                runtime.block_on(self.run());
            })
            .map_err(|e| AriaError::OrchestratorError(format!("Failed to spawn thread: {}", e)))
    }

    /// Process commands until shutdown or until every handle is dropped
    pub async fn run(mut self) {
        info!("Orchestrator started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                OrchestratorCommand::SendText(text) => {
                    let controller = self.controller.clone();
                    tokio::spawn(async move {
                        if let SubmitOutcome::Busy(status) = controller.submit(&text).await {
                            debug!("Message dropped while {}", status);
                        }
                    });
                }
                OrchestratorCommand::StartListening => match self.capture.start() {
                    Ok(StartOutcome::Started) => {}
                    Ok(outcome) => debug!("Listening not started: {:?}", outcome),
                    Err(e) => {
                        warn!("Cannot start listening: {}", e);
                        self.controller
                            .notify(Notification::from_error("Voice Input", &e));
                    }
                },
                OrchestratorCommand::StopListening => self.capture.stop(),
                OrchestratorCommand::ClearHistory => {
                    self.controller.clear_history();
                }
                OrchestratorCommand::Shutdown => {
                    info!("Orchestrator shutdown requested");
                    break;
                }
            }
        }

        self.capture.stop();
        self.controller.stop_speaking();
        info!("Orchestrator stopped");
    }
}

/// Builder for creating an orchestrator
///
/// Ports not set explicitly are chosen from the configuration and the
/// enabled cargo features.
pub struct OrchestratorBuilder {
    config: AssistantConfig,
    speech_input: Option<Arc<dyn SpeechInputPort>>,
    speech_output: Option<Arc<dyn SpeechOutputPort>>,
    navigation: Option<Arc<dyn NavigationPort>>,
}

impl OrchestratorBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: AssistantConfig::default(),
            speech_input: None,
            speech_output: None,
            navigation: None,
        }
    }

    /// Set the complete configuration
    pub fn with_config(mut self, config: AssistantConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_speech_input(mut self, input: Arc<dyn SpeechInputPort>) -> Self {
        self.speech_input = Some(input);
        self
    }

    pub fn with_speech_output(mut self, output: Arc<dyn SpeechOutputPort>) -> Self {
        self.speech_output = Some(output);
        self
    }

    pub fn with_navigation(mut self, navigation: Arc<dyn NavigationPort>) -> Self {
        self.navigation = Some(navigation);
        self
    }

    /// Build the orchestrator
    pub fn build(self) -> Result<(Orchestrator, OrchestratorHandle)> {
        let speech_input = match self.speech_input {
            Some(input) => input,
            None => default_speech_input(&self.config),
        };
        let speech_output = match self.speech_output {
            Some(output) => output,
            None => default_speech_output(&self.config),
        };
        let navigation = self
            .navigation
            .unwrap_or_else(|| Arc::new(SystemBrowser::new()));

        Orchestrator::new(self.config, speech_input, speech_output, navigation)
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn default_speech_input(config: &AssistantConfig) -> Arc<dyn SpeechInputPort> {
    if !config.enable_voice_input {
        info!("Voice input disabled");
        return Arc::new(UnavailableSpeechInput);
    }

    #[cfg(feature = "speech")]
    {
        match crate::speech::stt::WhisperSpeechInput::new(&config.stt) {
            Ok(input) => return Arc::new(input),
            Err(e) => warn!("Voice input unavailable: {}", e),
        }
    }

    #[cfg(not(feature = "speech"))]
    info!("Built without the `speech` feature, voice input unavailable");

    Arc::new(UnavailableSpeechInput)
}

fn default_speech_output(config: &AssistantConfig) -> Arc<dyn SpeechOutputPort> {
    if !config.enable_voice_output {
        info!("Voice output disabled");
        return Arc::new(SilentSpeechOutput);
    }

    #[cfg(feature = "speech")]
    {
        match crate::speech::tts::SherpaSpeechOutput::new(&config.tts) {
            Ok(output) => return Arc::new(output),
            Err(e) => warn!("Voice output unavailable: {}", e),
        }
    }

    #[cfg(not(feature = "speech"))]
    info!("Built without the `speech` feature, replies will not be spoken");

    Arc::new(SilentSpeechOutput)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::replies;
    use crate::conversation::ThinkingDelay;
    use crate::integration::testing::{
        RecordingNavigator, RecordingSpeechOutput, ScriptedSpeechInput,
    };
    use std::time::{Duration, Instant};

    fn quiet_config() -> AssistantConfig {
        AssistantConfig::default().with_delay(ThinkingDelay::none())
    }

    /// Poll until `done` holds or a generous deadline passes
    async fn wait_for(mut done: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done() {
            assert!(Instant::now() < deadline, "timed out waiting");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[test]
    fn test_orchestrator_creation() {
        let config = quiet_config().without_voice_input().without_voice_output();
        let result = OrchestratorBuilder::new().with_config(config).build();
        assert!(result.is_ok());

        let (_, handle) = result.unwrap();
        assert!(!handle.is_voice_available());
        assert!(!handle.is_audio_available());
        assert_eq!(handle.status(), ConversationStatus::Idle);
        assert!(handle.messages().is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = quiet_config().with_delay(ThinkingDelay::Random {
            min_ms: 500,
            max_ms: 100,
        });
        let result = OrchestratorBuilder::new().with_config(config).build();
        assert!(matches!(result, Err(AriaError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_send_text_runs_a_turn() {
        let navigator = Arc::new(RecordingNavigator::new());
        let (orchestrator, handle) = OrchestratorBuilder::new()
            .with_config(quiet_config())
            .with_speech_input(Arc::new(ScriptedSpeechInput::unavailable()))
            .with_speech_output(Arc::new(RecordingSpeechOutput::new()))
            .with_navigation(navigator.clone())
            .build()
            .unwrap();
        let worker = tokio::spawn(orchestrator.run());

        handle
            .send_command(OrchestratorCommand::SendText(
                "Search Google for rust async".to_string(),
            ))
            .unwrap();

        let messages = handle.messages();
        wait_for(|| messages.len() == 2).await;
        assert_eq!(messages.get_all()[1].text, replies::WEB_SEARCH);
        assert_eq!(
            navigator.opened(),
            vec!["https://www.google.com/search?q=rust%20async".to_string()]
        );

        handle.send_command(OrchestratorCommand::Shutdown).unwrap();
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn test_voice_commands() {
        let input = Arc::new(ScriptedSpeechInput::new());
        input.push_transcript("hi there");
        let (orchestrator, handle) = OrchestratorBuilder::new()
            .with_config(quiet_config())
            .with_speech_input(input.clone())
            .with_speech_output(Arc::new(RecordingSpeechOutput::new()))
            .with_navigation(Arc::new(RecordingNavigator::new()))
            .build()
            .unwrap();
        assert!(handle.is_voice_available());
        let worker = tokio::spawn(orchestrator.run());

        handle.send_command(OrchestratorCommand::StartListening).unwrap();
        let messages = handle.messages();
        wait_for(|| messages.len() == 2).await;
        assert!(messages.get_all()[0].metadata.is_speech);
        assert_eq!(messages.get_all()[1].text, replies::GREETING);
        wait_for(|| handle.status() == ConversationStatus::Idle).await;

        handle.send_command(OrchestratorCommand::ClearHistory).unwrap();
        wait_for(|| messages.is_empty()).await;

        drop(handle);
        // dropping the last handle ends the loop
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn test_start_listening_without_capture_notifies() {
        let (orchestrator, handle) = OrchestratorBuilder::new()
            .with_config(quiet_config())
            .with_speech_input(Arc::new(UnavailableSpeechInput))
            .with_speech_output(Arc::new(SilentSpeechOutput))
            .with_navigation(Arc::new(RecordingNavigator::new()))
            .build()
            .unwrap();
        let worker = tokio::spawn(orchestrator.run());

        handle.send_command(OrchestratorCommand::StartListening).unwrap();
        handle.send_command(OrchestratorCommand::Shutdown).unwrap();
        worker.await.unwrap();

        let mut notified = false;
        while let Some(event) = handle.try_recv_event() {
            if let ConversationEvent::Notification(n) = event {
                assert_eq!(n.title, "Voice Input");
                notified = true;
            }
        }
        assert!(notified);
        assert_eq!(handle.status(), ConversationStatus::Idle);
    }

    #[test]
    fn test_start_on_thread() {
        let (orchestrator, handle) = OrchestratorBuilder::new()
            .with_config(quiet_config())
            .with_speech_input(Arc::new(UnavailableSpeechInput))
            .with_speech_output(Arc::new(SilentSpeechOutput))
            .with_navigation(Arc::new(RecordingNavigator::new()))
            .build()
            .unwrap();
        let worker = orchestrator.start().unwrap();

        handle
            .send_command(OrchestratorCommand::SendText("hello".to_string()))
            .unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while handle.messages().len() < 2 {
            assert!(Instant::now() < deadline, "timed out waiting");
            thread::sleep(Duration::from_millis(5));
        }

        handle.send_command(OrchestratorCommand::Shutdown).unwrap();
        worker.join().unwrap();
        assert!(handle.send_command(OrchestratorCommand::ClearHistory).is_err());
    }
}
