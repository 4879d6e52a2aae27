pub mod audio;
pub mod stt;

// Re-export commonly used types for convenience
pub use audio::{AudioError, AudioPreprocessor, AudioResult, PcmFormat, preprocess};

pub use stt::{
    STTError, STTProvider, SpeechCapabilities, SpeechMetadata, SpeechProvider, SpeechResult,
    SpeechResultState, VoskSTT, VoskSTTConfig, create_stt_provider, create_stt_provider_from_enum,
    get_supported_stt_providers,
};
