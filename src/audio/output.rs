use crate::{AriaError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Mono sample queue drained by the output stream
pub type PlaybackQueue = Arc<Mutex<VecDeque<f32>>>;

/// Speaker playback fed from a shared queue
///
/// Samples must already be at [`AudioOutput::sample_rate`]. Clearing the
/// queue from any thread silences playback on the next callback.
pub struct AudioOutput {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    queue: PlaybackQueue,
}

impl AudioOutput {
    /// Create a new audio output with the default output device
    pub fn new(queue: PlaybackQueue) -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| AriaError::AudioDeviceError("No output device available".into()))?;

        info!(
            "Using output device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let config = device
            .default_output_config()
            .map_err(|e| {
                AriaError::AudioDeviceError(format!("Failed to get output config: {}", e))
            })?
            .into();

        Ok(Self {
            device,
            config,
            stream: None,
            queue,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    /// Open the output stream; it plays silence while the queue is empty
    pub fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let channels = self.config.channels as usize;
        let queue = Arc::clone(&self.queue);

        let err_fn = |err| {
            error!("Audio output stream error: {}", err);
        };

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut queue = queue.lock();
                    for frame in data.chunks_mut(channels) {
                        let sample = queue.pop_front().unwrap_or(0.0);
                        frame.fill(sample);
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| {
                AriaError::AudioDeviceError(format!("Failed to build output stream: {}", e))
            })?;

        stream.play().map_err(|e| {
            AriaError::AudioDeviceError(format!("Failed to start output stream: {}", e))
        })?;

        self.stream = Some(stream);
        debug!("Speaker open");
        Ok(())
    }

    pub fn enqueue(&self, samples: &[f32]) {
        self.queue.lock().extend(samples.iter().copied());
    }

    /// Samples still waiting to be played
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn stop(&mut self) {
        self.queue.lock().clear();
        if self.stream.take().is_some() {
            debug!("Speaker closed");
        }
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        self.stop();
    }
}
