//! Configuration for the Vosk speech provider
//!
//! Settings come from three places, in priority order:
//! YAML file > environment variables > .env file > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Layering YAML over environment values
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use vosk_stt::config::ProviderConfig;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ProviderConfig::from_env()?;
//!
//! // Load from YAML file with environment variables as the base
//! let config = ProviderConfig::from_file(Path::new("vosk.yaml"))?;
//!
//! println!("Recognizer at {}", config.vosk_url);
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::utils::UrlValidationError;

mod env;
mod merge;
mod validation;
mod yaml;

pub use yaml::{VoskYaml, YamlConfig};

/// Default gain in dB applied to the audio before recognition
pub const DEFAULT_VOL_INC: i32 = 5;
/// Default overall recognition timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Default bound on a single server response read
pub const DEFAULT_RESPONSE_TIMEOUT_SECS: u64 = 5;
/// Default (and advertised) recognition language
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Configuration errors, raised when the provider is built
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Invalid recognizer URL: {0}")]
    InvalidUrl(#[from] UrlValidationError),

    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Vosk provider settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Websocket URL of the Vosk server (`ws://` or `wss://`)
    pub vosk_url: String,
    /// Gain in dB; 0 disables amplification
    pub vol_inc: i32,
    /// Overall timeout for one recognition, in seconds
    pub timeout_secs: u64,
    /// Timeout for a single server response, in seconds
    pub response_timeout_secs: u64,
    pub language: String,
    /// Ask the server for word timings
    pub words: Option<bool>,
    /// Ask the server for n-best alternatives
    pub max_alternatives: Option<u32>,
}

impl ProviderConfig {
    /// Configuration for `vosk_url` with every other setting at its default.
    pub fn new(vosk_url: impl Into<String>) -> Self {
        Self {
            vosk_url: vosk_url.into(),
            vol_inc: DEFAULT_VOL_INC,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            response_timeout_secs: DEFAULT_RESPONSE_TIMEOUT_SECS,
            language: DEFAULT_LANGUAGE.to_string(),
            words: None,
            max_alternatives: None,
        }
    }

    pub fn with_vol_inc(mut self, vol_inc: i32) -> Self {
        self.vol_inc = vol_inc;
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_response_timeout_secs(mut self, response_timeout_secs: u64) -> Self {
        self.response_timeout_secs = response_timeout_secs;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_words(mut self, words: bool) -> Self {
        self.words = Some(words);
        self
    }

    pub fn with_max_alternatives(mut self, max_alternatives: u32) -> Self {
        self.max_alternatives = Some(max_alternatives);
        self
    }

    /// Load configuration from the process environment
    ///
    /// A `.env` file in the working directory is loaded first; variables
    /// already set in the environment take precedence over it.
    ///
    /// # Errors
    /// Returns an error if `VOSK_URL` is missing, a variable has an
    /// invalid format, or validation fails.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Load configuration using `lookup` to read variables.
    pub fn from_env_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let layer = env::load(&lookup)?;
        let config = merge::resolve(layer)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variables as the base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, a variable has
    /// an invalid format, or validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_file_with_env(path, |key| std::env::var(key).ok())
    }

    /// Load a YAML file, using `lookup` for the environment layer.
    pub fn from_file_with_env<F>(path: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let yaml_config = YamlConfig::from_file(path)?;
        let env_layer = env::load(&lookup)?;
        let config = merge::resolve(merge::overlay(env_layer, yaml_config.vosk))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field
    ///
    /// # Errors
    /// * `InvalidUrl` when the URL is not a `ws`/`wss` URL with a host
    /// * `InvalidValue` for a negative gain, a zero timeout or an empty language
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate_url(&self.vosk_url)?;
        validation::validate_vol_inc(self.vol_inc)?;
        validation::validate_timeout("timeout_secs", self.timeout_secs)?;
        validation::validate_timeout("response_timeout_secs", self.response_timeout_secs)?;
        validation::validate_language(&self.language)?;
        Ok(())
    }
}
