use crate::{AriaError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

/// Mono sample-rate converter
///
/// Use [`resample`](Self::resample) for a complete clip, or
/// [`push`](Self::push) to convert a live stream block by block.
pub struct AudioResampler {
    resampler: SincFixedIn<f32>,
    input_rate: u32,
    output_rate: u32,
    /// Input carried over until a full chunk is available
    pending: Vec<f32>,
}

impl AudioResampler {
    pub fn new(input_rate: u32, output_rate: u32) -> Result<Self> {
        if input_rate == 0 || output_rate == 0 {
            return Err(AriaError::ConfigError(
                "Sample rates must be greater than 0".into(),
            ));
        }

        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };

        let resampler = SincFixedIn::<f32>::new(
            output_rate as f64 / input_rate as f64,
            2.0,
            params,
            1024,
            1,
        )
        .map_err(|e| {
            AriaError::AudioProcessingError(format!("Failed to create resampler: {}", e))
        })?;

        debug!("Created resampler: {} Hz -> {} Hz", input_rate, output_rate);

        Ok(Self {
            resampler,
            input_rate,
            output_rate,
            pending: Vec::new(),
        })
    }

    fn ratio(&self) -> f64 {
        self.output_rate as f64 / self.input_rate as f64
    }

    fn process_chunk(&mut self, chunk: Vec<f32>) -> Result<Vec<f32>> {
        let mut output = self
            .resampler
            .process(&[chunk], None)
            .map_err(|e| AriaError::AudioProcessingError(format!("Resampling failed: {}", e)))?;
        Ok(output.swap_remove(0))
    }

    /// Convert a streamed block. Output lags input by up to one chunk.
    pub fn push(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        self.pending.extend_from_slice(input);

        let chunk_size = self.resampler.input_frames_max();
        let mut output = Vec::new();
        while self.pending.len() >= chunk_size {
            let chunk: Vec<f32> = self.pending.drain(..chunk_size).collect();
            output.extend(self.process_chunk(chunk)?);
        }
        Ok(output)
    }

    /// Convert a complete clip, zero-padding the final chunk
    pub fn resample(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        if input.is_empty() {
            return Ok(Vec::new());
        }

        let chunk_size = self.resampler.input_frames_max();
        let ratio = self.ratio();
        let mut output = Vec::with_capacity((input.len() as f64 * ratio * 1.1) as usize);

        for block in input.chunks(chunk_size) {
            let mut chunk = block.to_vec();
            chunk.resize(chunk_size, 0.0);
            let converted = self.process_chunk(chunk)?;

            // Only keep output for real input on the padded last chunk
            let keep = if block.len() < chunk_size {
                ((block.len() as f64) * ratio).ceil() as usize
            } else {
                converted.len()
            };
            output.extend_from_slice(&converted[..keep.min(converted.len())]);
        }

        debug!("Resampled {} -> {} samples", input.len(), output.len());
        Ok(output)
    }

    pub fn input_rate(&self) -> u32 {
        self.input_rate
    }

    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    pub fn reset(&mut self) {
        self.resampler.reset();
        self.pending.clear();
    }
}

/// Resample a mono clip in one step
pub fn resample_audio(input: &[f32], input_rate: u32, output_rate: u32) -> Result<Vec<f32>> {
    if input_rate == output_rate {
        return Ok(input.to_vec());
    }

    let mut resampler = AudioResampler::new(input_rate, output_rate)?;
    resampler.resample(input)
}
