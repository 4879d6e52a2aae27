//! Raw PCM → denoised, gain-adjusted WAV.

use tracing::{debug, warn};

use super::error::AudioResult;
use super::gain::apply_gain_db;
use super::noise_filter::{NoiseFilterConfig, NoiseReducer};
use super::wav::{PcmFormat, create_wav, decode_mono, encode_mono};

/// Gain applied when none is configured.
pub const DEFAULT_GAIN_DB: i32 = 5;

/// Audio cleanup stage run before audio is sent to the recognizer.
///
/// The output is always a single-channel WAV at the input sample rate and
/// sample width, holding exactly one sample per input frame.
pub struct AudioPreprocessor {
    noise_config: NoiseFilterConfig,
    gain_db: i32,
}

impl Default for AudioPreprocessor {
    fn default() -> Self {
        Self::new(DEFAULT_GAIN_DB)
    }
}

impl AudioPreprocessor {
    pub fn new(gain_db: i32) -> Self {
        Self {
            noise_config: NoiseFilterConfig::default(),
            gain_db,
        }
    }

    pub fn with_noise_config(mut self, noise_config: NoiseFilterConfig) -> Self {
        self.noise_config = noise_config;
        self
    }

    pub fn gain_db(&self) -> i32 {
        self.gain_db
    }

    /// Run the whole pipeline on `raw_pcm`.
    ///
    /// # Errors
    /// `AudioError::Encoding` when the buffer is not a whole number of frames
    /// or the format is unusable. A failing noise reduction step does not
    /// error: the un-denoised signal is used instead.
    pub fn process(&self, raw_pcm: &[u8], format: PcmFormat) -> AudioResult<Vec<u8>> {
        let container = create_wav(raw_pcm, format)?;
        let decoded = decode_mono(&container)?;

        let mut samples = match NoiseReducer::new(self.noise_config.clone())
            .and_then(|reducer| reducer.reduce(&decoded.samples, decoded.sample_rate))
        {
            Ok(denoised) => denoised,
            Err(e) => {
                warn!("Noise reduction unavailable, passing audio through: {}", e);
                decoded.samples
            }
        };

        apply_gain_db(&mut samples, self.gain_db);

        let wav = encode_mono(&samples, decoded.sample_rate, decoded.sample_width)?;
        debug!(
            "Preprocessed {} bytes of PCM into {} bytes of WAV ({} Hz, gain {} dB)",
            raw_pcm.len(),
            wav.len(),
            decoded.sample_rate,
            self.gain_db
        );
        Ok(wav)
    }
}

/// Wrap, denoise, amplify and re-encode `raw_pcm` in one call.
pub fn preprocess(raw_pcm: &[u8], format: PcmFormat, gain_db: i32) -> AudioResult<Vec<u8>> {
    AudioPreprocessor::new(gain_db).process(raw_pcm, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::audio::error::AudioError;
    use crate::core::audio::wav::wav_payload;

    fn tone_pcm(len: usize, amplitude: f32) -> Vec<u8> {
        (0..len)
            .map(|i| {
                let v = amplitude * (2.0 * std::f32::consts::PI * 220.0 * i as f32 / 16000.0).sin();
                (v * i16::MAX as f32) as i16
            })
            .flat_map(|s| s.to_le_bytes())
            .collect()
    }

    #[test]
    fn test_frame_count_preserved() {
        let pcm = tone_pcm(16000, 0.3);
        let wav = preprocess(&pcm, PcmFormat::default(), DEFAULT_GAIN_DB).unwrap();
        let payload = wav_payload(&wav).unwrap();
        assert_eq!(payload.frame_count(), 16000);
        assert_eq!(payload.channels, 1);
        assert_eq!(payload.sample_rate, 16000);
    }

    #[test]
    fn test_stereo_becomes_mono() {
        let pcm = vec![0u8; 4 * 1000];
        let wav = preprocess(&pcm, PcmFormat::new(16000, 2, 2), 0).unwrap();
        let payload = wav_payload(&wav).unwrap();
        assert_eq!(payload.channels, 1);
        assert_eq!(payload.frame_count(), 1000);
    }

    #[test]
    fn test_misaligned_input_is_encoding_error() {
        let result = preprocess(&[0u8; 301], PcmFormat::default(), 5);
        assert!(matches!(result, Err(AudioError::Encoding(_))));
    }

    #[test]
    fn test_empty_input() {
        let wav = preprocess(&[], PcmFormat::default(), 5).unwrap();
        let payload = wav_payload(&wav).unwrap();
        assert_eq!(payload.frame_count(), 0);
    }

    #[test]
    fn test_silence_stays_silent() {
        let wav = preprocess(&vec![0u8; 32000], PcmFormat::default(), 5).unwrap();
        let payload = wav_payload(&wav).unwrap();
        assert!(payload.data.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_default_gain() {
        assert_eq!(AudioPreprocessor::default().gain_db(), DEFAULT_GAIN_DB);
    }
}
