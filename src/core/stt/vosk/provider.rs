//! Host-facing Vosk provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::super::base::{
    AudioStream, ProviderInfo, STTError, SpeechCapabilities, SpeechMetadata, SpeechProvider,
    SpeechResult,
};
use super::client::VoskRecognizer;
use super::config::VoskSTTConfig;
use crate::config::ProviderConfig;
use crate::core::audio::{AudioPreprocessor, PcmFormat};

/// How long a timed-out job gets to close its connection.
const CANCEL_GRACE: Duration = Duration::from_secs(1);

/// Vosk speech-to-text provider.
///
/// Holds only immutable settings; every call to
/// [`process_audio_stream`](SpeechProvider::process_audio_stream) runs its
/// own job with its own connection.
pub struct VoskSTT {
    config: VoskSTTConfig,
    capabilities: SpeechCapabilities,
    preprocessor: Arc<AudioPreprocessor>,
    recognizer: Arc<VoskRecognizer>,
}

impl VoskSTT {
    /// Create a provider from already-parsed settings.
    ///
    /// # Errors
    /// `STTError::ConfigurationError` for a non-`ws`/`wss` endpoint, a
    /// negative gain or a zero timeout.
    pub fn new(config: VoskSTTConfig) -> Result<Self, STTError> {
        if !matches!(config.endpoint.scheme(), "ws" | "wss") {
            return Err(STTError::ConfigurationError(format!(
                "Vosk endpoint must be a ws:// or wss:// URL, got {}",
                config.endpoint
            )));
        }
        if config.gain_db < 0 {
            return Err(STTError::ConfigurationError(format!(
                "Gain must be zero or a positive number of dB, got {}",
                config.gain_db
            )));
        }
        if config.timeout.is_zero() || config.response_timeout.is_zero() {
            return Err(STTError::ConfigurationError(
                "Timeouts must be greater than zero".to_string(),
            ));
        }

        let preprocessor = AudioPreprocessor::new(config.gain_db)
            .with_noise_config(config.noise_filter.clone());

        Ok(Self {
            capabilities: config.capabilities(),
            preprocessor: Arc::new(preprocessor),
            recognizer: Arc::new(VoskRecognizer::new(&config)),
            config,
        })
    }

    pub fn from_provider_config(config: &ProviderConfig) -> Result<Self, STTError> {
        Self::new(VoskSTTConfig::from_provider_config(config)?)
    }

    pub fn config(&self) -> &VoskSTTConfig {
        &self.config
    }

    /// Preprocess and recognize `pcm` under the overall timeout.
    ///
    /// On expiry the job is cancelled, given a moment to close its
    /// connection, and `STTError::Timeout` is returned.
    pub async fn transcribe(&self, pcm: Bytes, format: PcmFormat) -> Result<String, STTError> {
        let cancel = CancellationToken::new();
        // Dropping this future also stops the job
        let _guard = cancel.clone().drop_guard();

        let mut job = tokio::spawn(run_job(
            Arc::clone(&self.preprocessor),
            Arc::clone(&self.recognizer),
            pcm,
            format,
            cancel.clone(),
        ));

        match timeout(self.config.timeout, &mut job).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(STTError::TaskFailed(join_error.to_string())),
            Err(_) => {
                warn!(
                    "Vosk recognition exceeded {:?}, cancelling",
                    self.config.timeout
                );
                cancel.cancel();
                if timeout(CANCEL_GRACE, job).await.is_err() {
                    debug!("Vosk job did not stop within {:?}", CANCEL_GRACE);
                }
                Err(STTError::Timeout(format!(
                    "recognition did not finish within {:?}",
                    self.config.timeout
                )))
            }
        }
    }
}

/// One recognition: preprocessing on the blocking pool, then streaming.
async fn run_job(
    preprocessor: Arc<AudioPreprocessor>,
    recognizer: Arc<VoskRecognizer>,
    pcm: Bytes,
    format: PcmFormat,
    cancel: CancellationToken,
) -> Result<String, STTError> {
    let processing = tokio::task::spawn_blocking(move || preprocessor.process(&pcm, format));

    let processed = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(STTError::Cancelled),
        processed = processing => processed,
    };
    let wav = processed.map_err(|e| STTError::TaskFailed(e.to_string()))??;

    recognizer.recognize(&wav, &cancel).await
}

#[async_trait]
impl SpeechProvider for VoskSTT {
    fn capabilities(&self) -> &SpeechCapabilities {
        &self.capabilities
    }

    fn default_language(&self) -> &str {
        &self.config.language
    }

    async fn process_audio_stream(
        &self,
        metadata: SpeechMetadata,
        mut stream: AudioStream,
    ) -> SpeechResult {
        if let Err(reason) = self.capabilities.check(&metadata) {
            warn!("Rejecting audio stream for Vosk: {}", reason);
            return SpeechResult::error();
        }

        let mut buffer = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            buffer.extend_from_slice(&chunk);
        }
        debug!("Collected {} bytes of audio for Vosk", buffer.len());

        match self.transcribe(buffer.freeze(), metadata.pcm_format()).await {
            Ok(text) if !text.is_empty() => {
                info!("Vosk transcript: {}", text);
                SpeechResult::success(text)
            }
            Ok(_) => {
                warn!("Vosk returned an empty transcript");
                SpeechResult::error()
            }
            Err(e) => {
                error!("Vosk STT error: {}", e);
                SpeechResult::error()
            }
        }
    }

    fn get_provider_info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "vosk",
            endpoint: self.config.endpoint.to_string(),
            default_language: self.config.language.clone(),
        }
    }
}
