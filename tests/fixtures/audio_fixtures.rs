//! Audio Test Fixtures
//!
//! Generated audio, so tests need no sample files and are reproducible.
//!
//! Audio format:
//! - Sample rate: 16kHz (16000 Hz)
//! - Bit depth: 16-bit signed PCM, little-endian
//! - Channels: Mono
//!
//! Available fixtures:
//! - Silence
//! - White noise (deterministic LCG)
//! - Sine wave tones
//! - Speech-like harmonic pattern, optionally buried in noise

use bytes::Bytes;
use futures::stream;
use std::f32::consts::PI;
use vosk_stt::core::stt::AudioStream;

/// Standard sample rate for STT (16kHz)
pub const SAMPLE_RATE: u32 = 16000;

/// Duration constants (in samples at 16kHz)
pub const MS_100: usize = 1600;
pub const MS_200: usize = 3200;
pub const SECOND: usize = 16000;

/// Generate silence (zeros)
pub fn generate_silence(duration_samples: usize) -> Vec<i16> {
    vec![0i16; duration_samples]
}

/// Generate silence as raw bytes
pub fn generate_silence_bytes(duration_samples: usize) -> Vec<u8> {
    samples_to_bytes(&generate_silence(duration_samples))
}

/// Generate white noise with specified amplitude (0.0 - 1.0)
pub fn generate_white_noise(duration_samples: usize, amplitude: f32) -> Vec<i16> {
    let max_amplitude = amplitude * i16::MAX as f32;
    let mut state: u64 = 12345;

    (0..duration_samples)
        .map(|_| {
            state = state.wrapping_mul(1103515245).wrapping_add(12345);
            let random = ((state >> 16) & 0x7FFF) as f32 / 0x7FFF as f32;
            ((random * 2.0 - 1.0) * max_amplitude) as i16
        })
        .collect()
}

/// Generate a sine wave tone
pub fn generate_sine_wave(duration_samples: usize, frequency: f32, amplitude: f32) -> Vec<i16> {
    let max_amplitude = amplitude * i16::MAX as f32;
    let angular_freq = 2.0 * PI * frequency / SAMPLE_RATE as f32;

    (0..duration_samples)
        .map(|i| ((angular_freq * i as f32).sin() * max_amplitude) as i16)
        .collect()
}

/// Generate a sine wave as raw bytes
pub fn generate_sine_wave_bytes(duration_samples: usize, frequency: f32, amplitude: f32) -> Vec<u8> {
    samples_to_bytes(&generate_sine_wave(duration_samples, frequency, amplitude))
}

/// Generate a harmonic pattern with a slowly varying envelope
pub fn generate_speech_pattern(duration_samples: usize) -> Vec<i16> {
    let base_freq = 150.0;
    let mut state: u64 = 54321;
    let mut envelope = 0.2f32;

    (0..duration_samples)
        .map(|i| {
            // New syllable every 50ms
            if i % 800 == 0 {
                state = state.wrapping_mul(1103515245).wrapping_add(12345);
                let target = ((state >> 16) & 0x7FFF) as f32 / 0x7FFF as f32;
                envelope = envelope * 0.7 + target * 0.3;
            }

            let t = i as f32 / SAMPLE_RATE as f32;
            let waveform = (2.0 * PI * base_freq * t).sin()
                + (2.0 * PI * base_freq * 2.0 * t).sin() * 0.5
                + (2.0 * PI * base_freq * 3.0 * t).sin() * 0.25;
            (waveform / 1.75 * envelope * i16::MAX as f32 * 0.6) as i16
        })
        .collect()
}

/// Generate speech-like pattern as raw bytes
pub fn generate_speech_pattern_bytes(duration_samples: usize) -> Vec<u8> {
    samples_to_bytes(&generate_speech_pattern(duration_samples))
}

/// Generate speech with additive white noise at `snr_db`
pub fn generate_noisy_speech_bytes(duration_samples: usize, snr_db: f32) -> Vec<u8> {
    let speech = generate_speech_pattern(duration_samples);
    let noise = generate_white_noise(duration_samples, 1.0);
    let noise_scale = 1.0 / 10.0f32.powf(snr_db / 10.0).sqrt();

    let mixed: Vec<i16> = speech
        .iter()
        .zip(noise.iter())
        .map(|(&s, &n)| {
            (s as f32 + n as f32 * noise_scale).clamp(i16::MIN as f32, i16::MAX as f32) as i16
        })
        .collect();
    samples_to_bytes(&mixed)
}

/// Convert i16 samples to little-endian bytes
pub fn samples_to_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Convert little-endian bytes to i16 samples
pub fn bytes_to_samples(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|chunk| i16::from_le_bytes([chunk[0], chunk[1]]))
        .collect()
}

/// Calculate peak amplitude
pub fn calculate_peak(samples: &[i16]) -> i16 {
    samples
        .iter()
        .map(|&s| s.saturating_abs())
        .max()
        .unwrap_or(0)
}

/// Split `bytes` into host-sized chunks of `chunk_size` bytes
pub fn chunked(bytes: &[u8], chunk_size: usize) -> Vec<Bytes> {
    bytes
        .chunks(chunk_size.max(1))
        .map(Bytes::copy_from_slice)
        .collect()
}

/// Audio stream as the host would deliver it
pub fn audio_stream(bytes: &[u8], chunk_size: usize) -> AudioStream {
    Box::pin(stream::iter(chunked(bytes, chunk_size)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_generation() {
        let silence = generate_silence(SECOND);
        assert_eq!(silence.len(), SECOND);
        assert!(silence.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_deterministic_generation() {
        assert_eq!(generate_white_noise(1000, 0.5), generate_white_noise(1000, 0.5));
        assert_eq!(generate_speech_pattern(1000), generate_speech_pattern(1000));
    }

    #[test]
    fn test_samples_bytes_conversion() {
        let samples = vec![0i16, 1000, -1000, i16::MAX, i16::MIN];
        assert_eq!(bytes_to_samples(&samples_to_bytes(&samples)), samples);
    }

    #[test]
    fn test_chunked_preserves_bytes() {
        let bytes = generate_silence_bytes(MS_100);
        let chunks = chunked(&bytes, 1000);
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks.iter().map(Bytes::len).sum::<usize>(), bytes.len());
    }
}
