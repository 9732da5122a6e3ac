use crate::audio::downmix;
use crate::{AriaError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::Stream;
use crossbeam_channel::Sender;
use tracing::{debug, error, info};

/// An open microphone. Mono f32 blocks at the device rate are sent to the
/// channel given to [`AudioInput::open`]; dropping the value closes the
/// device.
pub struct AudioInput {
    _stream: Stream,
    sample_rate: u32,
}

impl AudioInput {
    /// Whether the host has any microphone at all
    pub fn is_present() -> bool {
        cpal::default_host().default_input_device().is_some()
    }

    /// Open the default input device and start streaming into `audio_tx`.
    ///
    /// Blocks are dropped, not queued, when the receiver falls behind.
    pub fn open(audio_tx: Sender<Vec<f32>>) -> Result<Self> {
        let device = cpal::default_host()
            .default_input_device()
            .ok_or_else(|| AriaError::AudioDeviceError("No input device available".into()))?;

        let config: cpal::StreamConfig = device
            .default_input_config()
            .map_err(|e| AriaError::AudioDeviceError(format!("Failed to get input config: {}", e)))?
            .into();
        let channels = config.channels as usize;

        info!(
            "Microphone: {} ({} Hz, {} ch)",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            config.sample_rate.0,
            channels
        );

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let _ = audio_tx.try_send(downmix(data, channels));
                },
                |err| error!("Microphone stream error: {}", err),
                None,
            )
            .map_err(|e| AriaError::AudioDeviceError(format!("Failed to open microphone: {}", e)))?;

        stream
            .play()
            .map_err(|e| AriaError::AudioDeviceError(format!("Failed to start microphone: {}", e)))?;

        debug!("Microphone open");
        Ok(Self {
            _stream: stream,
            sample_rate: config.sample_rate.0,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn test_open_reports_rate() {
        // Skipped on machines without a microphone
        if !AudioInput::is_present() {
            return;
        }
        let (tx, _rx) = bounded(10);
        if let Ok(input) = AudioInput::open(tx) {
            assert!(input.sample_rate() > 0);
        }
    }
}
