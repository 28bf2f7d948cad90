//! Reading WAV files as raw PCM for streaming.

use std::path::Path;

use anyhow::{Context, Result, bail};
use hound::SampleFormat;
use wyoming_whisper_proto::AudioFormat;

/// Read an integer PCM WAV file into little-endian interleaved bytes.
pub fn read_pcm(path: &Path) -> Result<(AudioFormat, Vec<u8>)> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file: {}", path.display()))?;
    let spec = reader.spec();
    if spec.sample_format != SampleFormat::Int {
        bail!("Only integer PCM WAV files are supported");
    }

    let width = spec.bits_per_sample.div_ceil(8);
    let format = AudioFormat::new(spec.sample_rate, width, spec.channels);
    let mut pcm = Vec::with_capacity(reader.len() as usize * usize::from(width));

    match width {
        // 8-bit PCM is unsigned on the wire
        1 => {
            for sample in reader.samples::<i8>() {
                pcm.push((sample? as u8) ^ 0x80);
            }
        }
        2 => {
            for sample in reader.samples::<i16>() {
                pcm.extend_from_slice(&sample?.to_le_bytes());
            }
        }
        3 | 4 => {
            for sample in reader.samples::<i32>() {
                pcm.extend_from_slice(&sample?.to_le_bytes()[..usize::from(width)]);
            }
        }
        _ => bail!("Unsupported sample width: {} bits", spec.bits_per_sample),
    }

    Ok((format, pcm))
}
