use crate::{AriaError, Result};
use tracing::debug;
use voice_activity_detector::VoiceActivityDetector as VadDetector;

/// Silero voice activity detection at 16 kHz
pub struct VoiceActivityDetector {
    detector: VadDetector,
    threshold: f32,
}

impl VoiceActivityDetector {
    /// Samples per prediction (32ms at 16kHz)
    pub const CHUNK_SIZE: usize = 512;

    pub fn new(threshold: f32) -> Result<Self> {
        let detector = VadDetector::builder()
            .sample_rate(16000)
            .chunk_size(Self::CHUNK_SIZE)
            .build()
            .map_err(|e| AriaError::AudioProcessingError(format!("Failed to create VAD: {:?}", e)))?;

        debug!("Initialized VAD, threshold {}", threshold);

        Ok(Self {
            detector,
            threshold: threshold.clamp(0.0, 1.0),
        })
    }

    /// Whether a chunk of [`Self::CHUNK_SIZE`] mono samples contains speech
    pub fn is_speech(&mut self, chunk: &[f32]) -> bool {
        self.detector.predict(chunk.iter().copied()) >= self.threshold
    }

    pub fn reset(&mut self) {
        self.detector.reset();
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_is_not_speech() {
        let mut vad = VoiceActivityDetector::new(0.5).unwrap();
        assert!(!vad.is_speech(&[0.0; VoiceActivityDetector::CHUNK_SIZE]));
    }

    #[test]
    fn test_threshold_is_clamped() {
        let vad = VoiceActivityDetector::new(1.7).unwrap();
        assert_eq!(vad.threshold(), 1.0);
    }
}
