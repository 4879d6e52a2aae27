//! Provider-independent speech-to-text types.
//!
//! The host hands a provider an audio stream plus [`SpeechMetadata`] and
//! expects back a [`SpeechResult`]. Providers advertise what they accept
//! through [`SpeechCapabilities`].

use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::audio::{AudioError, PcmFormat};

// =============================================================================
// Errors
// =============================================================================

/// Errors raised while recognizing speech.
///
/// These never cross the host boundary; [`SpeechProvider::process_audio_stream`]
/// folds them into an ERROR [`SpeechResult`].
#[derive(Debug, Error)]
pub enum STTError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection closed by server: {0}")]
    ConnectionClosed(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Protocol error: {0}")]
    ProtocolError(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Recognition cancelled")]
    Cancelled,

    #[error("Recognizer returned no transcript")]
    NoTranscript,

    #[error("Audio processing failed: {0}")]
    AudioProcessing(#[from] AudioError),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Recognition task failed: {0}")]
    TaskFailed(String),
}

// =============================================================================
// Audio metadata
// =============================================================================

/// Container format of the inbound audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Wav,
    Ogg,
}

/// Codec of the inbound audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    Pcm,
    Opus,
}

/// Bits per sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioBitRate {
    #[serde(rename = "8")]
    Bits8,
    #[serde(rename = "16")]
    Bits16,
    #[serde(rename = "24")]
    Bits24,
    #[serde(rename = "32")]
    Bits32,
}

impl AudioBitRate {
    #[inline]
    pub fn bits(&self) -> u16 {
        match self {
            Self::Bits8 => 8,
            Self::Bits16 => 16,
            Self::Bits24 => 24,
            Self::Bits32 => 32,
        }
    }

    /// Sample width in bytes.
    #[inline]
    pub fn sample_width(&self) -> u16 {
        self.bits() / 8
    }
}

/// Sample rates a host may announce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioSampleRate {
    #[serde(rename = "8000")]
    Hz8000,
    #[serde(rename = "11025")]
    Hz11025,
    #[serde(rename = "16000")]
    Hz16000,
    #[serde(rename = "18900")]
    Hz18900,
    #[serde(rename = "22050")]
    Hz22050,
    #[serde(rename = "32000")]
    Hz32000,
    #[serde(rename = "37800")]
    Hz37800,
    #[serde(rename = "44100")]
    Hz44100,
    #[serde(rename = "48000")]
    Hz48000,
}

impl AudioSampleRate {
    #[inline]
    pub fn hz(&self) -> u32 {
        match self {
            Self::Hz8000 => 8000,
            Self::Hz11025 => 11025,
            Self::Hz16000 => 16000,
            Self::Hz18900 => 18900,
            Self::Hz22050 => 22050,
            Self::Hz32000 => 32000,
            Self::Hz37800 => 37800,
            Self::Hz44100 => 44100,
            Self::Hz48000 => 48000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioChannel {
    Mono,
    Stereo,
}

impl AudioChannel {
    #[inline]
    pub fn count(&self) -> u16 {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
        }
    }
}

/// Description of the audio stream the host is about to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechMetadata {
    pub language: String,
    pub format: AudioFormat,
    pub codec: AudioCodec,
    pub bit_rate: AudioBitRate,
    pub sample_rate: AudioSampleRate,
    pub channel: AudioChannel,
}

impl SpeechMetadata {
    /// Raw PCM layout implied by this metadata.
    pub fn pcm_format(&self) -> PcmFormat {
        PcmFormat::new(
            self.sample_rate.hz(),
            self.channel.count(),
            self.bit_rate.sample_width(),
        )
    }
}

impl Default for SpeechMetadata {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            format: AudioFormat::Wav,
            codec: AudioCodec::Pcm,
            bit_rate: AudioBitRate::Bits16,
            sample_rate: AudioSampleRate::Hz16000,
            channel: AudioChannel::Mono,
        }
    }
}

// =============================================================================
// Capabilities
// =============================================================================

/// What a provider accepts. Built once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechCapabilities {
    pub languages: Vec<String>,
    pub formats: Vec<AudioFormat>,
    pub codecs: Vec<AudioCodec>,
    pub bit_rates: Vec<AudioBitRate>,
    pub sample_rates: Vec<AudioSampleRate>,
    pub channels: Vec<AudioChannel>,
}

impl SpeechCapabilities {
    /// Check `metadata` against every capability list.
    ///
    /// Returns the first mismatch as a human-readable reason.
    pub fn check(&self, metadata: &SpeechMetadata) -> Result<(), String> {
        if !self
            .languages
            .iter()
            .any(|l| l.eq_ignore_ascii_case(&metadata.language))
        {
            return Err(format!("unsupported language: {}", metadata.language));
        }
        if !self.formats.contains(&metadata.format) {
            return Err(format!("unsupported format: {:?}", metadata.format));
        }
        if !self.codecs.contains(&metadata.codec) {
            return Err(format!("unsupported codec: {:?}", metadata.codec));
        }
        if !self.bit_rates.contains(&metadata.bit_rate) {
            return Err(format!(
                "unsupported bit rate: {}",
                metadata.bit_rate.bits()
            ));
        }
        if !self.sample_rates.contains(&metadata.sample_rate) {
            return Err(format!(
                "unsupported sample rate: {}",
                metadata.sample_rate.hz()
            ));
        }
        if !self.channels.contains(&metadata.channel) {
            return Err(format!("unsupported channel layout: {:?}", metadata.channel));
        }
        Ok(())
    }

    #[inline]
    pub fn supports(&self, metadata: &SpeechMetadata) -> bool {
        self.check(metadata).is_ok()
    }
}

// =============================================================================
// Results
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechResultState {
    Success,
    Error,
}

impl fmt::Display for SpeechResultState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Outcome handed back to the host.
///
/// ERROR results always carry empty text and SUCCESS results never do;
/// the constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeechResult {
    text: String,
    state: SpeechResultState,
}

impl SpeechResult {
    /// A SUCCESS result, or ERROR when `text` is empty.
    pub fn success(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return Self::error();
        }
        Self {
            text,
            state: SpeechResultState::Success,
        }
    }

    pub fn error() -> Self {
        Self {
            text: String::new(),
            state: SpeechResultState::Error,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn state(&self) -> SpeechResultState {
        self.state
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.state == SpeechResultState::Success
    }
}

impl From<Result<String, STTError>> for SpeechResult {
    fn from(outcome: Result<String, STTError>) -> Self {
        match outcome {
            Ok(text) => Self::success(text),
            Err(_) => Self::error(),
        }
    }
}

// =============================================================================
// Provider trait
// =============================================================================

/// Inbound audio chunks.
pub type AudioStream = Pin<Box<dyn Stream<Item = Bytes> + Send>>;

/// Static description of a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderInfo {
    pub name: &'static str,
    pub endpoint: String,
    pub default_language: String,
}

/// A speech-to-text backend the host can call.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    fn capabilities(&self) -> &SpeechCapabilities;

    fn default_language(&self) -> &str;

    /// Consume `stream` and return the transcript.
    ///
    /// Must never panic and never surface an error; failures become an
    /// ERROR result with empty text.
    async fn process_audio_stream(
        &self,
        metadata: SpeechMetadata,
        stream: AudioStream,
    ) -> SpeechResult;

    fn get_provider_info(&self) -> ProviderInfo;
}
