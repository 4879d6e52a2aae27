//! Vosk speech-to-text provider.
//!
//! Collects raw PCM from the host, cleans it up (spectral noise reduction
//! and gain), streams it to a Vosk websocket server and returns the
//! transcript as a [`SpeechResult`].

pub mod config;
pub mod core;
pub mod utils;

// Re-export commonly used items for convenience
pub use config::{ConfigError, ProviderConfig};
pub use self::core::*;
