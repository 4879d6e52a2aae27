//! Vosk websocket session driver.
//!
//! One call to [`VoskRecognizer::recognize`] owns one websocket connection
//! from connect to close:
//!
//! ```text
//! connect ─► config ─► frame₁ ─► response ─► … ─► frameₙ ─► response ─► {"eof":1} ─► final ─► close
//!                                   │
//!                                   └─ non-empty text: stop streaming, go to eof
//! ```

use std::time::Duration;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::{self, protocol::Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use super::super::base::STTError;
use super::config::{VoskSTTConfig, frame_bytes};
use super::messages::{ConfigMessage, EofMessage, Response};
use crate::core::audio::{WavPayload, wav_payload};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Upper bound on sending the close frame.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

// =============================================================================
// Recognizer
// =============================================================================

/// Streams one WAV buffer to a Vosk server and returns the transcript.
#[derive(Debug, Clone)]
pub struct VoskRecognizer {
    endpoint: Url,
    response_timeout: Duration,
    words: Option<bool>,
    max_alternatives: Option<u32>,
}

impl VoskRecognizer {
    pub fn new(config: &VoskSTTConfig) -> Self {
        if config.endpoint.scheme() == "wss" {
            install_crypto_provider();
        }

        Self {
            endpoint: config.endpoint.clone(),
            response_timeout: config.response_timeout,
            words: config.words,
            max_alternatives: config.max_alternatives,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Recognize speech in `wav`.
    ///
    /// The sample rate in the handshake comes from the WAV header. The
    /// connection is closed on every exit path, including cancellation.
    ///
    /// # Errors
    /// * `ConnectionFailed` if the server cannot be reached
    /// * `ConnectionClosed` if the server hangs up while audio is streaming
    /// * `Timeout` if a single response takes longer than the response timeout
    /// * `Cancelled` once `cancel` fires
    /// * `NoTranscript` if neither a final nor a partial text was received
    pub async fn recognize(
        &self,
        wav: &[u8],
        cancel: &CancellationToken,
    ) -> Result<String, STTError> {
        let payload = wav_payload(wav)?;
        let mut ws = self.connect(cancel).await?;

        let outcome = self.run_session(&mut ws, &payload, cancel).await;

        match timeout(CLOSE_TIMEOUT, ws.close(None)).await {
            Ok(Ok(())) => debug!("Vosk STT WebSocket connection closed"),
            Ok(Err(e)) => debug!("Vosk WebSocket close failed: {}", e),
            Err(_) => debug!("Timed out closing Vosk WebSocket"),
        }

        match &outcome {
            Ok(text) => info!("Vosk recognized {} characters", text.len()),
            Err(STTError::Cancelled) => warn!("Vosk recognition cancelled"),
            Err(STTError::Timeout(msg)) => warn!("Vosk recognition timed out: {}", msg),
            Err(e) => error!("Vosk recognition failed: {}", e),
        }
        outcome
    }

    async fn connect(&self, cancel: &CancellationToken) -> Result<WsStream, STTError> {
        let connecting = connect_async(self.endpoint.as_str());
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(STTError::Cancelled),
            result = connecting => result,
        };

        match result {
            Ok((ws, _response)) => {
                info!("Connected to Vosk STT WebSocket at {}", self.endpoint);
                Ok(ws)
            }
            Err(e) => {
                let stt_error = STTError::ConnectionFailed(format!(
                    "Failed to connect to Vosk at {}: {e}",
                    self.endpoint
                ));
                error!("{}", stt_error);
                Err(stt_error)
            }
        }
    }

    async fn run_session(
        &self,
        ws: &mut WsStream,
        payload: &WavPayload<'_>,
        cancel: &CancellationToken,
    ) -> Result<String, STTError> {
        let handshake = ConfigMessage::new(payload.sample_rate)
            .with_words(self.words)
            .with_max_alternatives(self.max_alternatives);
        send(ws, text_message(&handshake)?, cancel).await?;
        debug!("Sent Vosk config (sample_rate {})", payload.sample_rate);

        let chunk_size = frame_bytes(payload.sample_rate, payload.block_align);
        let mut last_text: Option<String> = None;

        for (index, frame) in payload.data.chunks(chunk_size).enumerate() {
            if cancel.is_cancelled() {
                return Err(STTError::Cancelled);
            }

            send(ws, Message::Binary(Bytes::copy_from_slice(frame)), cancel).await?;
            debug!("Sent {} bytes of audio to Vosk", frame.len());

            match self.next_response(ws, cancel).await? {
                Response::Text(text) => {
                    let has_text = !text.is_empty();
                    last_text = Some(text);
                    if has_text {
                        debug!("Vosk returned text after frame {}, finishing early", index + 1);
                        break;
                    }
                }
                Response::Malformed(reason) => {
                    debug!("Ignoring Vosk message: {}", reason);
                }
                Response::ConnectionClosed => {
                    return Err(STTError::ConnectionClosed(
                        "server closed the connection while audio was streaming".to_string(),
                    ));
                }
            }
        }

        send(ws, text_message(&EofMessage::default())?, cancel).await?;
        debug!("Sent end of stream to Vosk");

        let final_text = match self.next_response(ws, cancel).await? {
            Response::Text(text) => Some(text),
            Response::Malformed(reason) => {
                debug!("Ignoring final Vosk message: {}", reason);
                None
            }
            Response::ConnectionClosed => {
                debug!("Vosk closed the connection before the final result");
                None
            }
        };

        select_transcript(final_text, last_text)
    }

    /// Read the next data message, skipping control frames.
    async fn next_response(
        &self,
        ws: &mut WsStream,
        cancel: &CancellationToken,
    ) -> Result<Response, STTError> {
        loop {
            let message = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(STTError::Cancelled),
                message = timeout(self.response_timeout, ws.next()) => message,
            };

            let Ok(message) = message else {
                return Err(STTError::Timeout(format!(
                    "no response from Vosk within {:?}",
                    self.response_timeout
                )));
            };

            match message {
                Some(Ok(Message::Text(text))) => {
                    debug!("Received Vosk message: {}", text.as_str());
                    return Ok(Response::parse(text.as_str()));
                }
                Some(Ok(Message::Binary(_))) => {
                    return Ok(Response::Malformed(
                        "unexpected binary message".to_string(),
                    ));
                }
                Some(Ok(Message::Close(close_frame))) => {
                    info!("Vosk WebSocket closed: {:?}", close_frame);
                    return Ok(Response::ConnectionClosed);
                }
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                    debug!("Received ping/pong from Vosk");
                }
                Some(Ok(Message::Frame(_))) => {}
                Some(Err(
                    tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed,
                ))
                | None => return Ok(Response::ConnectionClosed),
                Some(Err(e)) => {
                    return Err(STTError::NetworkError(format!(
                        "Vosk WebSocket error: {e}"
                    )));
                }
            }
        }
    }
}

/// Pick the transcript: final text if non-empty, else the last captured
/// text, else nothing.
pub fn select_transcript(
    final_text: Option<String>,
    last_text: Option<String>,
) -> Result<String, STTError> {
    match (final_text, last_text) {
        (Some(text), _) if !text.is_empty() => Ok(text),
        (_, Some(text)) => Ok(text),
        _ => Err(STTError::NoTranscript),
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Install the process-level rustls provider used by `wss://` connections.
///
/// A provider installed earlier by the host is left in place.
fn install_crypto_provider() {
    if rustls::crypto::CryptoProvider::get_default().is_none()
        && rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
    {
        debug!("rustls crypto provider was installed concurrently");
    }
}

fn text_message<T: serde::Serialize>(value: &T) -> Result<Message, STTError> {
    let json = serde_json::to_string(value)
        .map_err(|e| STTError::ProtocolError(format!("Failed to encode message: {e}")))?;
    Ok(Message::Text(json.into()))
}

async fn send(
    ws: &mut WsStream,
    message: Message,
    cancel: &CancellationToken,
) -> Result<(), STTError> {
    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(STTError::Cancelled),
        result = ws.send(message) => result,
    };

    result.map_err(|e| match e {
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
            STTError::ConnectionClosed(format!("send failed: {e}"))
        }
        other => STTError::NetworkError(format!("Failed to send to Vosk: {other}")),
    })
}
