//! Audio decoding and processing for the transcription backend.
//!
//! Reads a recorded WAV file and converts it to 16kHz mono f32 for speech recognition.

use anyhow::{Context, Result};
use audioadapter_buffers::direct::SequentialSliceOfVecs;
use rubato::audioadapter::Adapter;
use rubato::{Fft, FixedSync, Resampler};
use std::path::Path;

/// Target sample rate for speech recognition models.
pub const TARGET_SAMPLE_RATE: u32 = 16000;

/// Number of input frames per resampler chunk.
const RESAMPLER_CHUNK_SIZE: usize = 1024;

/// Audio buffer containing mono f32 samples at a known sample rate.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Create a new audio buffer.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Duration of the buffer in seconds.
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Load a PCM WAV file, normalized to [-1.0, 1.0] and mixed down to mono.
    pub fn from_wav(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = hound::WavReader::open(path)
            .with_context(|| format!("Failed to open WAV file: {}", path.display()))?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<_, _>>()
                .context("Failed to read WAV samples")?,
            hound::SampleFormat::Int => {
                let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|s| s as f32 / max_val))
                    .collect::<Result<_, _>>()
                    .context("Failed to read WAV samples")?
            }
        };

        Ok(Self::new(
            to_mono(&samples, spec.channels),
            spec.sample_rate,
        ))
    }

    /// Resample to `rate`, returning the buffer unchanged if it already matches.
    pub fn resampled(self, rate: u32) -> Result<Self> {
        if self.sample_rate == rate || self.samples.is_empty() {
            return Ok(Self::new(self.samples, rate));
        }

        let mut resampler = AudioResampler::new(self.sample_rate, rate, RESAMPLER_CHUNK_SIZE)?;
        let chunk = resampler.chunk_size();
        let expected_len =
            (self.samples.len() as u64 * u64::from(rate) / u64::from(self.sample_rate)) as usize;

        // Pad to whole chunks, then feed silence until the delayed tail is out
        let mut input = self.samples;
        let padded_len = input.len().div_ceil(chunk) * chunk;
        input.resize(padded_len, 0.0);

        let delay = resampler.output_delay();
        let mut output = resampler.process(&input)?;
        let silence = vec![0.0; chunk];
        while output.len() < delay + expected_len {
            output.extend(resampler.process(&silence)?);
        }

        output.drain(..delay);
        output.truncate(expected_len);
        Ok(Self::new(output, rate))
    }
}

/// Convert multi-channel interleaved samples to mono by averaging all channels.
pub fn to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }

    let channels = channels as usize;
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Resampler for converting audio between sample rates.
pub struct AudioResampler {
    resampler: Fft<f32>,
    chunk_size_in: usize,
}

impl AudioResampler {
    /// Create a new resampler.
    ///
    /// # Arguments
    /// * `input_rate` - Input sample rate in Hz
    /// * `output_rate` - Output sample rate in Hz
    /// * `chunk_size` - Number of input samples per processing chunk
    pub fn new(input_rate: u32, output_rate: u32, chunk_size: usize) -> Result<Self> {
        let resampler = Fft::new(
            input_rate as usize,
            output_rate as usize,
            chunk_size,
            1, // sub_chunks
            1, // channels
            FixedSync::Input,
        )
        .context("Failed to create resampler")?;

        Ok(Self {
            resampler,
            chunk_size_in: chunk_size,
        })
    }

    /// Resample audio data. Input length must be a multiple of chunk_size.
    pub fn process(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        if input.is_empty() {
            return Ok(Vec::new());
        }

        let mut output = Vec::new();
        let input_chunks = input.chunks_exact(self.chunk_size_in);

        for chunk in input_chunks {
            let input_vecs = vec![chunk.to_vec()];
            let input_adapter = SequentialSliceOfVecs::new(&input_vecs, 1, chunk.len())
                .map_err(|e| anyhow::anyhow!("Invalid resampler input: {:?}", e))?;
            let resampled = self
                .resampler
                .process(&input_adapter, 0, None)
                .context("Resampling failed")?;

            for frame_idx in 0..resampled.frames() {
                output.push(resampled.read_sample(0, frame_idx).unwrap_or(0.0));
            }
        }

        Ok(output)
    }

    /// Output frames the resampler lags behind its input.
    pub fn output_delay(&self) -> usize {
        self.resampler.output_delay()
    }

    /// Get the required input chunk size.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size_in
    }
}

#[cfg(test)]
#[path = "audio_test.rs"]
mod tests;
