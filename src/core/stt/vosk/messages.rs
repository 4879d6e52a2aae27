//! WebSocket message types for the Vosk recognizer server.
//!
//! - **Outgoing**: [`ConfigMessage`] (text, once per session), raw binary
//!   audio frames, then [`EofMessage`].
//! - **Incoming**: JSON recognizer results. The server answers every frame
//!   with either `{"partial": "..."}` or `{"text": "...", "result": [...]}`,
//!   and with `{"alternatives": [...]}` when `max_alternatives` is set.

use serde::{Deserialize, Serialize};

// =============================================================================
// Outgoing Messages (Client to Server)
// =============================================================================

/// Recognizer settings sent as the first message of a session.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigMessage {
    pub config: RecognizerConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecognizerConfig {
    pub sample_rate: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub words: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_alternatives: Option<u32>,
}

impl ConfigMessage {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            config: RecognizerConfig {
                sample_rate,
                words: None,
                max_alternatives: None,
            },
        }
    }

    pub fn with_words(mut self, words: Option<bool>) -> Self {
        self.config.words = words;
        self
    }

    pub fn with_max_alternatives(mut self, max_alternatives: Option<u32>) -> Self {
        self.config.max_alternatives = max_alternatives;
        self
    }
}

/// End-of-stream marker. The server answers with its final result.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EofMessage {
    pub eof: u8,
}

impl Default for EofMessage {
    fn default() -> Self {
        Self { eof: 1 }
    }
}

// =============================================================================
// Incoming Messages (Server to Client)
// =============================================================================

/// One recognized word, present when `words` is enabled.
#[derive(Debug, Clone, Deserialize)]
pub struct WordResult {
    pub word: String,
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: f64,
    #[serde(default)]
    pub conf: f64,
}

/// One n-best hypothesis.
#[derive(Debug, Clone, Deserialize)]
pub struct Alternative {
    pub text: String,
    #[serde(default)]
    pub confidence: f64,
}

/// Any JSON object the server may send.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoskResult {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub partial: Option<String>,
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
    #[serde(default)]
    pub result: Vec<WordResult>,
}

/// Classified server message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Recognized text, possibly empty: the `text` of a flat result or
    /// the first entry of `alternatives`. Vosk's own `partial` field
    /// never produces this variant.
    Text(String),
    /// Anything without a usable `text` value
    Malformed(String),
    /// The server closed the socket
    ConnectionClosed,
}

impl Response {
    /// Classify a text frame.
    ///
    /// Streaming partials (`{"partial": ...}`) have no `text` field and are
    /// reported as [`Response::Malformed`].
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<VoskResult>(raw) {
            Ok(result) => {
                if let Some(text) = result.text {
                    Self::Text(text)
                } else if let Some(best) = result.alternatives.into_iter().next() {
                    Self::Text(best.text)
                } else if result.partial.is_some() {
                    Self::Malformed("partial result without text field".to_string())
                } else {
                    Self::Malformed("result has no text field".to_string())
                }
            }
            Err(e) => Self::Malformed(format!("invalid JSON: {e}")),
        }
    }

    /// Text of a recognizer result, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}
