//! Audio device and signal helpers for the native speech backends

#[cfg(feature = "audio-io")]
pub mod input;
#[cfg(feature = "audio-io")]
pub mod output;
#[cfg(feature = "speech")]
pub mod resampler;
#[cfg(feature = "speech")]
pub mod vad;

#[cfg(feature = "audio-io")]
pub use input::AudioInput;
#[cfg(feature = "audio-io")]
pub use output::AudioOutput;
#[cfg(feature = "speech")]
pub use resampler::{resample_audio, AudioResampler};
#[cfg(feature = "speech")]
pub use vad::VoiceActivityDetector;

/// Sample rate expected by the speech-to-text model
pub const WHISPER_SAMPLE_RATE: u32 = 16000;

/// Downmix interleaved frames to mono by averaging channels
pub fn downmix(data: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return data.to_vec();
    }
    data.chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Scale samples by `gain`, clamping to the valid range
pub fn apply_gain(samples: &mut [f32], gain: f32) {
    for sample in samples.iter_mut() {
        *sample = (*sample * gain).clamp(-1.0, 1.0);
    }
}
