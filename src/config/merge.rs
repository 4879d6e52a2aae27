//! Layering of configuration sources

use super::yaml::VoskYaml;
use super::{
    ConfigError, DEFAULT_LANGUAGE, DEFAULT_RESPONSE_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS,
    DEFAULT_VOL_INC, ProviderConfig,
};

/// Apply `overrides` on top of `base`, field by field.
pub(super) fn overlay(base: VoskYaml, overrides: Option<VoskYaml>) -> VoskYaml {
    let Some(top) = overrides else {
        return base;
    };

    VoskYaml {
        url: top.url.or(base.url),
        vol_inc: top.vol_inc.or(base.vol_inc),
        timeout_secs: top.timeout_secs.or(base.timeout_secs),
        response_timeout_secs: top.response_timeout_secs.or(base.response_timeout_secs),
        language: top.language.or(base.language),
        words: top.words.or(base.words),
        max_alternatives: top.max_alternatives.or(base.max_alternatives),
    }
}

/// Fill defaults into a merged layer.
pub(super) fn resolve(layer: VoskYaml) -> Result<ProviderConfig, ConfigError> {
    let vosk_url = layer.url.ok_or(ConfigError::MissingField("vosk_url"))?;

    Ok(ProviderConfig {
        vosk_url,
        vol_inc: layer.vol_inc.unwrap_or(DEFAULT_VOL_INC),
        timeout_secs: layer.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        response_timeout_secs: layer
            .response_timeout_secs
            .unwrap_or(DEFAULT_RESPONSE_TIMEOUT_SECS),
        language: layer
            .language
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        words: layer.words,
        max_alternatives: layer.max_alternatives,
    })
}
