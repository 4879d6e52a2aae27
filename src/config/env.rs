//! Environment variable loading

use std::str::FromStr;

use super::ConfigError;
use super::yaml::VoskYaml;

pub(super) const VOSK_URL: &str = "VOSK_URL";
pub(super) const VOSK_VOL_INC: &str = "VOSK_VOL_INC";
pub(super) const VOSK_TIMEOUT_SECS: &str = "VOSK_TIMEOUT_SECS";
pub(super) const VOSK_RESPONSE_TIMEOUT_SECS: &str = "VOSK_RESPONSE_TIMEOUT_SECS";
pub(super) const VOSK_LANGUAGE: &str = "VOSK_LANGUAGE";
pub(super) const VOSK_WORDS: &str = "VOSK_WORDS";
pub(super) const VOSK_MAX_ALTERNATIVES: &str = "VOSK_MAX_ALTERNATIVES";

/// Read every `VOSK_*` variable through `lookup`.
///
/// Unset and empty variables are left as `None`.
pub(super) fn load<F>(lookup: &F) -> Result<VoskYaml, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    Ok(VoskYaml {
        url: get(VOSK_URL),
        vol_inc: parse_var(get(VOSK_VOL_INC), "vol_inc")?,
        timeout_secs: parse_var(get(VOSK_TIMEOUT_SECS), "timeout_secs")?,
        response_timeout_secs: parse_var(
            get(VOSK_RESPONSE_TIMEOUT_SECS),
            "response_timeout_secs",
        )?,
        language: get(VOSK_LANGUAGE),
        words: get(VOSK_WORDS).map(|v| parse_bool(&v, "words")).transpose()?,
        max_alternatives: parse_var(get(VOSK_MAX_ALTERNATIVES), "max_alternatives")?,
    })
}

fn parse_var<T>(value: Option<String>, field: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|v| {
            v.parse::<T>().map_err(|e| ConfigError::InvalidValue {
                field,
                reason: format!("{v:?}: {e}"),
            })
        })
        .transpose()
}

fn parse_bool(value: &str, field: &'static str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field,
            reason: format!("{value:?} is not a boolean"),
        }),
    }
}
