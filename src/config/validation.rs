//! Configuration validation logic

use super::ConfigError;
use crate::utils::validate_websocket_url;

pub(super) fn validate_url(url: &str) -> Result<(), ConfigError> {
    if url.trim().is_empty() {
        return Err(ConfigError::MissingField("vosk_url"));
    }
    validate_websocket_url(url)?;
    Ok(())
}

pub(super) fn validate_vol_inc(vol_inc: i32) -> Result<(), ConfigError> {
    if vol_inc < 0 {
        return Err(ConfigError::InvalidValue {
            field: "vol_inc",
            reason: format!("must be zero or a positive integer, got {vol_inc}"),
        });
    }
    Ok(())
}

pub(super) fn validate_timeout(field: &'static str, secs: u64) -> Result<(), ConfigError> {
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}

pub(super) fn validate_language(language: &str) -> Result<(), ConfigError> {
    if language.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "language",
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}
