//! VITS text-to-speech through sherpa-onnx

use crate::audio::output::PlaybackQueue;
use crate::audio::{apply_gain, resample_audio, AudioOutput};
use crate::integration::config::{TtsConfig, VoiceSettings};
use crate::integration::ports::SpeechOutputPort;
use crate::speech::normalize::normalize_text_for_tts;
use crate::{AriaError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use sherpa_rs::tts::{VitsTts, VitsTtsConfig};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info, warn};

/// A reply waiting to be spoken
#[derive(Debug, Clone)]
struct SpeechJob {
    text: String,
    voice: VoiceSettings,
    /// Jobs from before the last `cancel` are skipped
    generation: u64,
}

/// VITS engine wrapper
pub struct TtsEngine {
    tts: VitsTts,
    speaker_id: i32,
}

impl TtsEngine {
    pub fn new(config: &TtsConfig) -> Result<Self> {
        check_model_files(config)?;

        info!("Loading VITS TTS model from: {}", config.model_path);

        let vits_config = VitsTtsConfig {
            model: config.model_path.clone(),
            tokens: config.tokens_path.clone(),
            lexicon: config.lexicon_path.clone().unwrap_or_default(),
            data_dir: config.data_dir.clone().unwrap_or_default(),
            ..Default::default()
        };

        let tts = VitsTts::new(vits_config);
        info!("TTS engine initialized successfully");

        Ok(Self {
            tts,
            speaker_id: config.speaker_id,
        })
    }

    /// Synthesize already-normalized text; returns samples and their rate
    pub fn synthesize(&mut self, text: &str, voice: &VoiceSettings) -> Result<(Vec<f32>, u32)> {
        let audio = self
            .tts
            .create(text, self.speaker_id, voice.rate)
            .map_err(|e| AriaError::SpeechOutputError(format!("Synthesis failed: {}", e)))?;

        let mut samples = audio.samples;
        apply_gain(&mut samples, voice.volume);
        Ok((samples, audio.sample_rate as u32))
    }
}

fn check_model_files(config: &TtsConfig) -> Result<()> {
    if config.model_path.is_empty() {
        return Err(AriaError::ConfigError("TTS model path is required".into()));
    }
    if config.tokens_path.is_empty() {
        return Err(AriaError::ConfigError("TTS tokens path is required".into()));
    }
    for path in [&config.model_path, &config.tokens_path] {
        if !Path::new(path).exists() {
            return Err(AriaError::ModelLoadError(format!("Not found: {}", path)));
        }
    }
    Ok(())
}

/// Speaks replies on a worker thread that owns the engine and the speaker
pub struct SherpaSpeechOutput {
    job_tx: Sender<SpeechJob>,
    generation: Arc<AtomicU64>,
    queue: PlaybackQueue,
}

impl SherpaSpeechOutput {
    pub fn new(config: &TtsConfig) -> Result<Self> {
        check_model_files(config)?;

        let (job_tx, job_rx) = unbounded();
        let generation = Arc::new(AtomicU64::new(0));
        let queue = PlaybackQueue::default();

        let worker_config = config.clone();
        let worker_generation = Arc::clone(&generation);
        let worker_queue = Arc::clone(&queue);
        thread::Builder::new()
            .name("aria-tts".to_string())
            .spawn(move || speech_worker(worker_config, job_rx, worker_generation, worker_queue))
            .map_err(|e| AriaError::SpeechOutputError(format!("Failed to spawn worker: {}", e)))?;

        Ok(Self {
            job_tx,
            generation,
            queue,
        })
    }
}

impl SpeechOutputPort for SherpaSpeechOutput {
    fn speak(&self, text: &str, voice: &VoiceSettings) -> Result<()> {
        let text = normalize_text_for_tts(text);
        if text.is_empty() {
            return Ok(());
        }

        self.job_tx
            .send(SpeechJob {
                text,
                voice: *voice,
                generation: self.generation.load(Ordering::SeqCst),
            })
            .map_err(|_| AriaError::SpeechOutputError("speech worker has stopped".to_string()))
    }

    fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.queue.lock().clear();
    }
}

fn speech_worker(
    config: TtsConfig,
    job_rx: Receiver<SpeechJob>,
    generation: Arc<AtomicU64>,
    queue: PlaybackQueue,
) {
    info!("TTS worker starting");

    let mut engine = match TtsEngine::new(&config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Failed to initialize TTS engine: {}", e);
            return;
        }
    };
    let mut output = match AudioOutput::new(queue) {
        Ok(output) => output,
        Err(e) => {
            error!("Failed to open speaker: {}", e);
            return;
        }
    };
    if let Err(e) = output.start() {
        error!("{}", e);
        return;
    }

    // Runs until the SherpaSpeechOutput is dropped
    for job in job_rx {
        if job.generation != generation.load(Ordering::SeqCst) {
            debug!("Skipping cancelled reply");
            continue;
        }

        if (job.voice.pitch - 1.0).abs() > f32::EPSILON {
            debug!("Pitch {} is not supported by VITS, ignoring", job.voice.pitch);
        }

        let (samples, rate) = match engine.synthesize(&job.text, &job.voice) {
            Ok(audio) => audio,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };
        let samples = match resample_audio(&samples, rate, output.sample_rate()) {
            Ok(samples) => samples,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };

        // Cancelled while synthesizing
        if job.generation != generation.load(Ordering::SeqCst) {
            continue;
        }

        debug!(
            "Speaking {:.2}s of audio",
            samples.len() as f32 / output.sample_rate() as f32
        );
        output.enqueue(&samples);
    }

    info!("TTS worker stopped");
}
