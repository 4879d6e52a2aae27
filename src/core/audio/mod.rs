//! Audio preprocessing for speech recognition.
//!
//! Raw PCM collected from the host is wrapped in a WAV container, passed
//! through non-stationary spectral-gating noise reduction, amplified by a
//! fixed decibel gain and re-encoded as WAV bytes. Everything happens in
//! memory.
//!
//! - [`wav`]: WAV container creation, decoding and payload access (`hound`)
//! - [`noise_filter`]: STFT-based noise reduction (`realfft`)
//! - [`gain`]: logarithmic gain
//! - [`preprocessor`]: the assembled pipeline

mod error;
pub mod gain;
pub mod noise_filter;
pub mod preprocessor;
pub mod wav;

pub use error::{AudioError, AudioResult};
pub use noise_filter::{NoiseFilterConfig, NoiseReducer, reduce_noise, reduce_noise_async};
pub use preprocessor::{AudioPreprocessor, DEFAULT_GAIN_DB, preprocess};
pub use wav::{DecodedAudio, PcmFormat, WavPayload, create_wav, decode_mono, encode_mono, wav_payload};
