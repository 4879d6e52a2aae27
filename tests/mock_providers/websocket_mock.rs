//! WebSocket Mock Server for the Vosk recognizer
//!
//! Speaks the vosk-server protocol: a JSON config message, binary audio
//! frames each answered with one JSON result, then `{"eof":1}` answered
//! with the final result. Replies are scripted per frame, and everything
//! the client sends is recorded in arrival order.

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// What the mock does after receiving a frame or the eof marker
#[derive(Debug, Clone)]
pub enum Reply {
    /// Send this JSON object as a text message
    Json(Value),
    /// Send this text verbatim (for malformed payloads)
    Raw(String),
    /// Say nothing
    Silent,
    /// Close the connection
    Close,
}

impl Reply {
    pub fn text(text: &str) -> Self {
        Reply::Json(json!({ "text": text }))
    }

    pub fn partial(partial: &str) -> Self {
        Reply::Json(json!({ "partial": partial }))
    }
}

/// Scripted server behavior
#[derive(Debug, Clone)]
pub struct VoskMockScript {
    /// Reply to frame `i`; frames past the end get `default_reply`
    pub frame_replies: Vec<Reply>,
    pub default_reply: Reply,
    /// Reply to `{"eof":1}`
    pub final_reply: Reply,
}

impl Default for VoskMockScript {
    fn default() -> Self {
        Self {
            frame_replies: Vec::new(),
            default_reply: Reply::partial(""),
            final_reply: Reply::text(""),
        }
    }
}

impl VoskMockScript {
    /// Streaming partials for every frame, then `text` as the final result
    pub fn final_text(text: &str) -> Self {
        Self {
            final_reply: Reply::text(text),
            ..Default::default()
        }
    }

    /// Never answers anything
    pub fn silent() -> Self {
        Self {
            frame_replies: Vec::new(),
            default_reply: Reply::Silent,
            final_reply: Reply::Silent,
        }
    }

    fn reply_for(&self, frame_index: usize) -> &Reply {
        self.frame_replies
            .get(frame_index)
            .unwrap_or(&self.default_reply)
    }
}

/// Something the client did, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum MockEvent {
    Config(Value),
    Frame(Vec<u8>),
    Eof,
    Text(String),
    Close,
}

/// Everything recorded across all connections
#[derive(Debug, Clone, Default)]
pub struct MockRecord {
    pub connections: usize,
    pub events: Vec<MockEvent>,
}

impl MockRecord {
    pub fn config(&self) -> Option<&Value> {
        self.events.iter().find_map(|event| match event {
            MockEvent::Config(value) => Some(value),
            _ => None,
        })
    }

    pub fn frames(&self) -> Vec<&[u8]> {
        self.events
            .iter()
            .filter_map(|event| match event {
                MockEvent::Frame(data) => Some(data.as_slice()),
                _ => None,
            })
            .collect()
    }

    pub fn frame_count(&self) -> usize {
        self.frames().len()
    }

    pub fn received_eof(&self) -> bool {
        self.events.contains(&MockEvent::Eof)
    }

    pub fn closed_by_client(&self) -> bool {
        self.events.contains(&MockEvent::Close)
    }

    /// Frames received after the eof marker
    pub fn frames_after_eof(&self) -> usize {
        self.events
            .iter()
            .skip_while(|event| **event != MockEvent::Eof)
            .filter(|event| matches!(event, MockEvent::Frame(_)))
            .count()
    }
}

/// Running mock server bound to an ephemeral localhost port
pub struct VoskMockServer {
    addr: SocketAddr,
    record: Arc<Mutex<MockRecord>>,
    handle: JoinHandle<()>,
}

impl VoskMockServer {
    pub async fn start(script: VoskMockScript) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock listener");
        let addr = listener.local_addr().expect("mock listener address");
        let record = Arc::new(Mutex::new(MockRecord::default()));
        let script = Arc::new(script);

        let server_record = Arc::clone(&record);
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let record = Arc::clone(&server_record);
                let script = Arc::clone(&script);
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, script, record).await {
                        eprintln!("Vosk mock connection error: {}", e);
                    }
                });
            }
        });

        Self {
            addr,
            record,
            handle,
        }
    }

    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Snapshot of everything received so far
    pub fn record(&self) -> MockRecord {
        self.record.lock().expect("mock record lock").clone()
    }

    /// Poll until the client's close frame arrives
    pub async fn wait_for_close(&self, within: Duration) -> bool {
        let deadline = Instant::now() + within;
        while Instant::now() < deadline {
            if self.record().closed_by_client() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.record().closed_by_client()
    }
}

impl Drop for VoskMockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Handle a single recognizer session
async fn handle_connection(
    stream: TcpStream,
    script: Arc<VoskMockScript>,
    record: Arc<Mutex<MockRecord>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ws_stream = accept_async(stream).await?;
    let (mut write, mut read) = ws_stream.split();

    push(&record, None);
    let mut frame_index = 0usize;

    while let Some(msg) = read.next().await {
        let reply = match msg {
            Ok(Message::Text(text)) => {
                let value: Value = serde_json::from_str(text.as_str()).unwrap_or(Value::Null);
                if value.get("config").is_some() {
                    push(&record, Some(MockEvent::Config(value)));
                    continue;
                } else if value.get("eof").is_some() {
                    push(&record, Some(MockEvent::Eof));
                    &script.final_reply
                } else {
                    push(&record, Some(MockEvent::Text(text.as_str().to_string())));
                    continue;
                }
            }
            Ok(Message::Binary(data)) => {
                push(&record, Some(MockEvent::Frame(data.to_vec())));
                let reply = script.reply_for(frame_index);
                frame_index += 1;
                reply
            }
            Ok(Message::Close(_)) => {
                push(&record, Some(MockEvent::Close));
                break;
            }
            Ok(Message::Ping(data)) => {
                write.send(Message::Pong(data)).await?;
                continue;
            }
            Ok(_) => continue,
            Err(_) => break,
        };

        match reply {
            Reply::Json(value) => write.send(Message::Text(value.to_string().into())).await?,
            Reply::Raw(raw) => write.send(Message::Text(raw.clone().into())).await?,
            Reply::Silent => {}
            Reply::Close => {
                write.send(Message::Close(None)).await?;
                break;
            }
        }
    }

    Ok(())
}

/// Record an event; `None` counts a new connection
fn push(record: &Mutex<MockRecord>, event: Option<MockEvent>) {
    let mut record = record.lock().expect("mock record lock");
    match event {
        Some(event) => record.events.push(event),
        None => record.connections += 1,
    }
}
