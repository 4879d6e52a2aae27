mod base;
pub mod vosk;

pub use base::{
    AudioBitRate, AudioChannel, AudioCodec, AudioFormat, AudioSampleRate, AudioStream,
    ProviderInfo, STTError, SpeechCapabilities, SpeechMetadata, SpeechProvider, SpeechResult,
    SpeechResultState,
};

pub use vosk::{VoskRecognizer, VoskSTT, VoskSTTConfig};

use crate::config::ProviderConfig;

/// Supported STT providers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum STTProvider {
    /// Self-hosted Vosk websocket server
    Vosk,
}

impl std::fmt::Display for STTProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            STTProvider::Vosk => write!(f, "vosk"),
        }
    }
}

impl std::str::FromStr for STTProvider {
    type Err = STTError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vosk" | "vosk-server" => Ok(STTProvider::Vosk),
            _ => Err(STTError::ConfigurationError(format!(
                "Unsupported STT provider: {s}. Supported providers: vosk"
            ))),
        }
    }
}

/// Factory function to create STT providers by name
///
/// # Arguments
/// * `provider` - The name of the STT provider (e.g., "vosk")
/// * `config` - Configuration for the STT provider
///
/// # Returns
/// * `Result<Box<dyn SpeechProvider>, STTError>` - A boxed STT provider or error
///
/// # Examples
/// ```rust,no_run
/// use vosk_stt::config::ProviderConfig;
/// use vosk_stt::core::stt::create_stt_provider;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ProviderConfig::new("ws://localhost:2700");
///     let stt = create_stt_provider("vosk", &config)?;
///     println!("Default language: {}", stt.default_language());
///     Ok(())
/// }
/// ```
pub fn create_stt_provider(
    provider: &str,
    config: &ProviderConfig,
) -> Result<Box<dyn SpeechProvider>, STTError> {
    create_stt_provider_from_enum(provider.parse()?, config)
}

/// Factory function to create STT providers using the enum directly
pub fn create_stt_provider_from_enum(
    provider: STTProvider,
    config: &ProviderConfig,
) -> Result<Box<dyn SpeechProvider>, STTError> {
    match provider {
        STTProvider::Vosk => Ok(Box::new(VoskSTT::from_provider_config(config)?)),
    }
}

/// Get a list of all supported STT providers
pub fn get_supported_stt_providers() -> Vec<&'static str> {
    vec!["vosk"]
}
