//! Mock Provider Servers
//!
//! Local stand-ins for the recognizer backends, bound to ephemeral ports so
//! tests can run in parallel.

// Each test binary uses a different subset of the mocks
#![allow(dead_code)]

pub mod websocket_mock;

pub use websocket_mock::{MockEvent, MockRecord, Reply, VoskMockScript, VoskMockServer};
