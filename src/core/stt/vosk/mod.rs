//! Vosk speech-to-text integration.
//!
//! Vosk runs as a self-hosted websocket server (`vosk-server`, default port
//! 2700). A session is a JSON config message, binary PCM frames, and an
//! end-of-stream marker; the server answers every frame with a JSON result.
//!
//! # Architecture
//!
//! - [`config`]: Validated provider settings (`VoskSTTConfig`) and frame sizing
//! - [`messages`]: WebSocket message types and response classification
//! - [`client`]: The `VoskRecognizer` session driver
//! - [`provider`]: The host-facing `VoskSTT` provider
//!
//! # Pipeline
//!
//! Audio chunks are collected into one buffer, cleaned up (noise reduction
//! and gain) on the blocking pool, then streamed to the server in 0.2 s
//! frames. The first non-empty `text` ends streaming early. Everything
//! runs under one overall timeout.
//!
//! # Example
//!
//! ```rust,no_run
//! use vosk_stt::config::ProviderConfig;
//! use vosk_stt::core::stt::{SpeechMetadata, SpeechProvider, VoskSTT};
//! use bytes::Bytes;
//! use futures::stream;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProviderConfig::new("ws://192.168.1.10:2700");
//!     let stt = VoskSTT::from_provider_config(&config)?;
//!
//!     let chunks = vec![Bytes::from(vec![0u8; 32000])];
//!     let result = stt
//!         .process_audio_stream(SpeechMetadata::default(), Box::pin(stream::iter(chunks)))
//!         .await;
//!
//!     println!("{:?}: {}", result.state(), result.text());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod messages;
pub mod provider;


pub use client::{VoskRecognizer, select_transcript};
pub use config::{FRAME_DURATION_SECS, VoskSTTConfig, frame_bytes};
pub use messages::{Alternative, ConfigMessage, EofMessage, Response, VoskResult};
pub use provider::VoskSTT;
