//! Whisper speech-to-text

use crate::audio::{AudioInput, AudioResampler, VoiceActivityDetector, WHISPER_SAMPLE_RATE};
use crate::integration::config::{RecognitionConfig, SttConfig};
use crate::integration::ports::SpeechInputPort;
use crate::speech::endpoint::{Endpoint, EndpointConfig, Endpointer};
use crate::{AriaError, Result};
use async_trait::async_trait;
use crossbeam_channel::{bounded, RecvTimeoutError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// How often the capture loop checks for cancellation
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Whisper engine shared between captures
pub struct WhisperEngine {
    context: WhisperContext,
    n_threads: i32,
}

impl WhisperEngine {
    pub fn new(config: &SttConfig) -> Result<Self> {
        info!("Loading Whisper model from: {:?}", config.model_path);

        if !config.model_path.exists() {
            return Err(AriaError::ModelLoadError(format!(
                "Model file not found: {:?}",
                config.model_path
            )));
        }

        let context = WhisperContext::new_with_params(
            config
                .model_path
                .to_str()
                .ok_or_else(|| AriaError::ModelLoadError("Invalid model path".to_string()))?,
            WhisperContextParameters::default(),
        )
        .map_err(|e| AriaError::ModelLoadError(format!("Failed to load Whisper model: {:?}", e)))?;

        info!("Whisper model loaded successfully");

        Ok(Self {
            context,
            n_threads: config.n_threads,
        })
    }

    /// Transcribe 16 kHz mono audio
    pub fn transcribe(&self, samples: &[f32], language: &str) -> Result<String> {
        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_n_threads(self.n_threads);
        params.set_translate(false);
        params.set_print_timestamps(false);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_single_segment(true);
        params.set_language(Some(language));

        let mut state = self.context.create_state().map_err(|e| {
            AriaError::CaptureFailure(format!("Failed to create state: {:?}", e))
        })?;

        state
            .full(params, samples)
            .map_err(|e| AriaError::CaptureFailure(format!("Transcription failed: {:?}", e)))?;

        let num_segments = state
            .full_n_segments()
            .map_err(|e| AriaError::CaptureFailure(format!("Failed to get segments: {:?}", e)))?;

        let mut text = String::new();
        for i in 0..num_segments {
            let segment = state.full_get_segment_text(i).map_err(|e| {
                AriaError::CaptureFailure(format!("Failed to get segment text: {:?}", e))
            })?;
            text.push_str(&segment);
        }

        Ok(clean_transcript(&text))
    }
}

/// Strip whitespace and Whisper's non-speech markers like `[BLANK_AUDIO]`
fn clean_transcript(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => cleaned.push(c),
            _ => {}
        }
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Identifies one capture. It is cancelled once the shared generation
/// moves past it, by `cancel` or by the next capture starting.
#[derive(Clone)]
struct CaptureToken {
    generation: Arc<AtomicU64>,
    id: u64,
}

impl CaptureToken {
    fn next(generation: &Arc<AtomicU64>) -> Self {
        Self {
            generation: Arc::clone(generation),
            id: generation.fetch_add(1, Ordering::SeqCst) + 1,
        }
    }

    fn is_cancelled(&self) -> bool {
        self.generation.load(Ordering::SeqCst) != self.id
    }
}

/// Microphone capture transcribed with Whisper
pub struct WhisperSpeechInput {
    engine: Arc<WhisperEngine>,
    config: SttConfig,
    generation: Arc<AtomicU64>,
}

impl WhisperSpeechInput {
    /// Load the model. Fails if it is missing or there is no microphone.
    pub fn new(config: &SttConfig) -> Result<Self> {
        if !AudioInput::is_present() {
            return Err(AriaError::CaptureUnavailable(
                "no microphone found".to_string(),
            ));
        }

        Ok(Self {
            engine: Arc::new(WhisperEngine::new(config)?),
            config: config.clone(),
            generation: Arc::new(AtomicU64::new(0)),
        })
    }
}

#[async_trait]
impl SpeechInputPort for WhisperSpeechInput {
    fn is_available(&self) -> bool {
        true
    }

    async fn listen(&self, recognition: &RecognitionConfig) -> Result<String> {
        let token = CaptureToken::next(&self.generation);
        let engine = Arc::clone(&self.engine);
        let language = recognition.language_code().to_string();
        let endpoint = EndpointConfig {
            silence_secs: self.config.silence_secs,
            min_speech_secs: self.config.min_speech_secs,
            max_secs: recognition.max_duration_secs,
        };
        let vad_threshold = self.config.vad_threshold;

        // cpal streams are not Send; the whole capture stays on one thread
        tokio::task::spawn_blocking(move || {
            let samples = match record_utterance(endpoint, vad_threshold, &token)? {
                Some(samples) => samples,
                None => return Ok(String::new()),
            };
            if token.is_cancelled() {
                return Err(AriaError::CaptureFailure("aborted".to_string()));
            }

            debug!(
                "Transcribing {:.2}s of audio",
                samples.len() as f32 / WHISPER_SAMPLE_RATE as f32
            );
            engine.transcribe(&samples, &language)
        })
        .await
        .map_err(|e| AriaError::CaptureFailure(format!("capture task failed: {}", e)))?
    }

    fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

/// Record until the speaker stops. `None` when nothing was said.
fn record_utterance(
    endpoint: EndpointConfig,
    vad_threshold: f32,
    token: &CaptureToken,
) -> Result<Option<Vec<f32>>> {
    let (audio_tx, audio_rx) = bounded(256);
    let input = AudioInput::open(audio_tx)?;
    let mut resampler = match input.sample_rate() {
        WHISPER_SAMPLE_RATE => None,
        rate => Some(AudioResampler::new(rate, WHISPER_SAMPLE_RATE)?),
    };
    let mut vad = VoiceActivityDetector::new(vad_threshold)?;
    let mut endpointer = Endpointer::new(endpoint);

    let mut pending: Vec<f32> = Vec::new();
    let outcome = loop {
        if token.is_cancelled() {
            return Err(AriaError::CaptureFailure("aborted".to_string()));
        }

        let block = match audio_rx.recv_timeout(POLL_INTERVAL) {
            Ok(block) => block,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                return Err(AriaError::AudioDeviceError(
                    "input stream closed".to_string(),
                ))
            }
        };

        match resampler.as_mut() {
            Some(resampler) => pending.extend(resampler.push(&block)?),
            None => pending.extend(block),
        }

        let mut result = Endpoint::Continue;
        let whole = pending.len() / VoiceActivityDetector::CHUNK_SIZE * VoiceActivityDetector::CHUNK_SIZE;
        for chunk in pending[..whole].chunks(VoiceActivityDetector::CHUNK_SIZE) {
            result = endpointer.push(chunk, vad.is_speech(chunk));
            if result != Endpoint::Continue {
                break;
            }
        }
        pending.drain(..whole);

        if result != Endpoint::Continue {
            break result;
        }
    };

    // Close the microphone before transcribing
    drop(input);

    match outcome {
        Endpoint::Utterance(samples) => Ok(Some(samples)),
        _ => {
            debug!("No speech detected");
            Ok(None)
        }
    }
}
