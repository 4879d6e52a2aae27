//! Configuration types for the Vosk websocket recognizer.

use std::time::Duration;

use url::Url;

use super::super::base::{
    AudioBitRate, AudioChannel, AudioCodec, AudioFormat, AudioSampleRate, STTError,
    SpeechCapabilities,
};
use crate::config::{
    DEFAULT_LANGUAGE, DEFAULT_RESPONSE_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS, DEFAULT_VOL_INC,
    ProviderConfig,
};
use crate::core::audio::NoiseFilterConfig;

/// Length of one streamed audio frame.
pub const FRAME_DURATION_SECS: f64 = 0.2;

// =============================================================================
// Provider configuration
// =============================================================================

/// Validated, immutable settings for one Vosk provider instance.
#[derive(Debug, Clone)]
pub struct VoskSTTConfig {
    /// Recognizer websocket endpoint
    pub endpoint: Url,
    /// Gain applied after noise reduction, in dB
    pub gain_db: i32,
    /// Overall bound on one recognition
    pub timeout: Duration,
    /// Bound on each individual server response
    pub response_timeout: Duration,
    /// Language reported as default and accepted from the host
    pub language: String,
    pub words: Option<bool>,
    pub max_alternatives: Option<u32>,
    pub noise_filter: NoiseFilterConfig,
}

impl VoskSTTConfig {
    /// Settings for `endpoint` with defaults everywhere else.
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            gain_db: DEFAULT_VOL_INC,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            response_timeout: Duration::from_secs(DEFAULT_RESPONSE_TIMEOUT_SECS),
            language: DEFAULT_LANGUAGE.to_string(),
            words: None,
            max_alternatives: None,
            noise_filter: NoiseFilterConfig::default(),
        }
    }

    /// Build from user-facing configuration, validating it first.
    pub fn from_provider_config(config: &ProviderConfig) -> Result<Self, STTError> {
        config
            .validate()
            .map_err(|e| STTError::ConfigurationError(e.to_string()))?;

        let endpoint = Url::parse(config.vosk_url.trim())
            .map_err(|e| STTError::ConfigurationError(format!("Invalid Vosk URL: {e}")))?;

        Ok(Self {
            endpoint,
            gain_db: config.vol_inc,
            timeout: Duration::from_secs(config.timeout_secs),
            response_timeout: Duration::from_secs(config.response_timeout_secs),
            language: config.language.clone(),
            words: config.words,
            max_alternatives: config.max_alternatives,
            noise_filter: NoiseFilterConfig::default(),
        })
    }

    /// Capabilities advertised to the host.
    pub fn capabilities(&self) -> SpeechCapabilities {
        SpeechCapabilities {
            languages: vec![self.language.clone()],
            formats: vec![AudioFormat::Wav],
            codecs: vec![AudioCodec::Pcm],
            bit_rates: vec![AudioBitRate::Bits16],
            sample_rates: vec![AudioSampleRate::Hz16000],
            channels: vec![AudioChannel::Mono],
        }
    }
}

/// Bytes per streamed frame: `round(0.2 * sample_rate)` frames, at least one.
#[inline]
pub fn frame_bytes(sample_rate: u32, block_align: usize) -> usize {
    let frames = (FRAME_DURATION_SECS * f64::from(sample_rate)).round() as usize;
    frames.max(1) * block_align.max(1)
}
