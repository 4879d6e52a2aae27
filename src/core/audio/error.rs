//! Error types for audio preprocessing.

use thiserror::Error;

/// Result type for audio preprocessing operations.
pub type AudioResult<T> = Result<T, AudioError>;

/// Errors that can occur while converting or filtering PCM audio.
#[derive(Debug, Error)]
pub enum AudioError {
    /// The raw PCM buffer or its declared format is unusable
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The WAV container could not be written or read back
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// The spectral noise reduction step could not run
    #[error("Noise reduction failed: {0}")]
    NoiseReduction(String),
}
