use super::*;
use tempfile::TempDir;

fn write_wav(path: &Path, rate: u32, channels: u16, samples: &[i16]) {
    let spec = hound::WavSpec {
        channels,
        sample_rate: rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &sample in samples {
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn test_audio_buffer_duration() {
    // 16000 samples at 16kHz = 1 second
    let buffer = AudioBuffer::new(vec![0.0; 16000], 16000);
    assert!((buffer.duration_secs() - 1.0).abs() < f32::EPSILON);
}

#[test]
fn test_audio_buffer_duration_zero_rate() {
    let buffer = AudioBuffer::new(vec![0.0; 10], 0);
    assert_eq!(buffer.duration_secs(), 0.0);
}

#[test]
fn test_to_mono_passthrough() {
    let samples = vec![0.1, 0.2, 0.3];
    let mono = to_mono(&samples, 1);

    assert_eq!(mono, samples);
}

#[test]
fn test_to_mono_stereo() {
    let stereo = vec![0.2, 0.4, 0.6, 0.8];
    let mono = to_mono(&stereo, 2);

    assert_eq!(mono.len(), 2);
    assert!((mono[0] - 0.3).abs() < f32::EPSILON);
    assert!((mono[1] - 0.7).abs() < f32::EPSILON);
}

#[test]
fn test_to_mono_quad() {
    // 4 channels: average of 0.1, 0.2, 0.3, 0.4 = 0.25
    let quad = vec![0.1, 0.2, 0.3, 0.4];
    let mono = to_mono(&quad, 4);

    assert_eq!(mono.len(), 1);
    assert!((mono[0] - 0.25).abs() < f32::EPSILON);
}

#[test]
fn test_from_wav_normalizes_and_mixes_down() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("stereo.wav");
    write_wav(&path, 22050, 2, &[16384, 0, -32768, -32768]);

    let buffer = AudioBuffer::from_wav(&path).unwrap();

    assert_eq!(buffer.sample_rate, 22050);
    assert_eq!(buffer.samples.len(), 2);
    assert!((buffer.samples[0] - 0.25).abs() < 1e-6);
    assert!((buffer.samples[1] + 1.0).abs() < 1e-6);
}

#[test]
fn test_from_wav_missing_file() {
    let temp = TempDir::new().unwrap();
    let err = AudioBuffer::from_wav(temp.path().join("nope.wav")).unwrap_err();
    assert!(err.to_string().contains("Failed to open WAV file"));
}

#[test]
fn test_resampled_same_rate_is_unchanged() {
    let buffer = AudioBuffer::new(vec![0.1, 0.2, 0.3], 16000);
    let out = buffer.resampled(TARGET_SAMPLE_RATE).unwrap();
    assert_eq!(out.samples, vec![0.1, 0.2, 0.3]);
}

#[test]
fn test_resampled_partial_chunk_length() {
    // 1.5 resampler chunks at 48kHz -> 512 samples at 16kHz
    let input: Vec<f32> = (0..1536)
        .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 48000.0).sin())
        .collect();
    let out = AudioBuffer::new(input, 48000)
        .resampled(TARGET_SAMPLE_RATE)
        .unwrap();

    assert_eq!(out.sample_rate, TARGET_SAMPLE_RATE);
    assert_eq!(out.samples.len(), 512);
}

#[test]
fn test_resampled_keeps_loud_tail() {
    // 1s at 48kHz, silent except the final 20ms
    let mut input = vec![0.0f32; 48000];
    for sample in &mut input[47040..] {
        *sample = 0.8;
    }

    let out = AudioBuffer::new(input, 48000)
        .resampled(TARGET_SAMPLE_RATE)
        .unwrap();

    assert_eq!(out.samples.len(), 16000);
    let tail = &out.samples[15720..15960];
    let tail_mean = tail.iter().map(|s| s.abs()).sum::<f32>() / tail.len() as f32;
    assert!(tail_mean > 0.5, "tail mean {}", tail_mean);

    // Nothing is shifted earlier than where the loud part starts
    let first_loud = out.samples.iter().position(|s| s.abs() > 0.4).unwrap();
    assert!(first_loud > 15600, "first loud sample at {}", first_loud);
}

#[test]
fn test_resampler_reports_delay() {
    let resampler = AudioResampler::new(48000, 16000, 1024).unwrap();
    assert!(resampler.output_delay() > 0);
}

#[test]
fn test_resampler_creation() {
    let resampler = AudioResampler::new(48000, 16000, 1024);
    assert!(resampler.is_ok());
}

#[test]
fn test_resampler_downsample() {
    let mut resampler = AudioResampler::new(48000, 16000, 480).unwrap();

    // Generate 480 samples of a 1kHz sine wave at 48kHz
    let input: Vec<f32> = (0..480)
        .map(|i| (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / 48000.0).sin())
        .collect();

    let output = resampler.process(&input).unwrap();

    // Output should be roughly 1/3 the size (480 * 16000/48000 = 160)
    assert_eq!(output.len(), 160);
}

#[test]
fn test_resampler_upsample() {
    let mut resampler = AudioResampler::new(8000, 16000, 160).unwrap();

    let input: Vec<f32> = (0..160)
        .map(|i| (2.0 * std::f32::consts::PI * 500.0 * i as f32 / 8000.0).sin())
        .collect();

    let output = resampler.process(&input).unwrap();

    assert_eq!(output.len(), 320);
}

#[test]
fn test_resampler_empty_input() {
    let mut resampler = AudioResampler::new(48000, 16000, 480).unwrap();
    let output = resampler.process(&[]).unwrap();

    assert!(output.is_empty());
}
