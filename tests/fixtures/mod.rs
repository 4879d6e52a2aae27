//! Test Fixtures Module
//!
//! Generated audio and stream helpers shared by the integration tests.

// Each test binary uses a different subset of the fixtures
#![allow(dead_code)]

pub mod audio_fixtures;

pub use audio_fixtures::*;
