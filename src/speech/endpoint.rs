//! End-of-utterance detection over VAD decisions

use crate::audio::WHISPER_SAMPLE_RATE;

/// Timing rules for one capture, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndpointConfig {
    /// Trailing silence that ends an utterance
    pub silence_secs: f32,
    /// Speech shorter than this is treated as a click or cough
    pub min_speech_secs: f32,
    /// Hard cap on the whole capture
    pub max_secs: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Endpoint {
    /// Keep feeding audio
    Continue,
    /// A complete utterance, 16 kHz mono
    Utterance(Vec<f32>),
    /// The capture ran out of time without usable speech
    NoSpeech,
}

/// Accumulates 16 kHz chunks until the speaker stops
pub struct Endpointer {
    config: EndpointConfig,
    buffer: Vec<f32>,
    in_speech: bool,
    speech_secs: f32,
    silence_secs: f32,
    elapsed_secs: f32,
}

impl Endpointer {
    pub fn new(config: EndpointConfig) -> Self {
        Self {
            config,
            buffer: Vec::new(),
            in_speech: false,
            speech_secs: 0.0,
            silence_secs: 0.0,
            elapsed_secs: 0.0,
        }
    }

    /// Feed one chunk along with the VAD decision for it
    pub fn push(&mut self, chunk: &[f32], is_speech: bool) -> Endpoint {
        let duration = chunk.len() as f32 / WHISPER_SAMPLE_RATE as f32;
        self.elapsed_secs += duration;

        if is_speech {
            self.in_speech = true;
            self.buffer.extend_from_slice(chunk);
            self.speech_secs += duration;
            self.silence_secs = 0.0;
        } else if self.in_speech {
            self.buffer.extend_from_slice(chunk);
            self.silence_secs += duration;

            if self.silence_secs >= self.config.silence_secs {
                if self.speech_secs >= self.config.min_speech_secs {
                    return Endpoint::Utterance(std::mem::take(&mut self.buffer));
                }
                self.reset_speech();
            }
        }

        if self.elapsed_secs >= self.config.max_secs {
            return self.finish();
        }

        Endpoint::Continue
    }

    /// End the capture now with whatever has been heard
    pub fn finish(&mut self) -> Endpoint {
        if self.in_speech && self.speech_secs >= self.config.min_speech_secs {
            Endpoint::Utterance(std::mem::take(&mut self.buffer))
        } else {
            Endpoint::NoSpeech
        }
    }

    fn reset_speech(&mut self) {
        self.buffer.clear();
        self.in_speech = false;
        self.speech_secs = 0.0;
        self.silence_secs = 0.0;
    }
}
