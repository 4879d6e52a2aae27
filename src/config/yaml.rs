use serde::Deserialize;
use std::path::Path;

use super::ConfigError;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration; anything left
/// out falls back to the environment and then to defaults.
///
/// # Example YAML structure
/// ```yaml
/// vosk:
///   url: "ws://192.168.1.10:2700"
///   vol_inc: 5
///   timeout_secs: 10
///   response_timeout_secs: 5
///   language: "en-US"
///   words: false
///   max_alternatives: 0
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub vosk: Option<VoskYaml>,
}

/// Vosk provider section
///
/// Also used as the partial layer built from environment variables.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct VoskYaml {
    #[serde(alias = "vosk_url")]
    pub url: Option<String>,
    pub vol_inc: Option<i32>,
    pub timeout_secs: Option<u64>,
    pub response_timeout_secs: Option<u64>,
    pub language: Option<String>,
    pub words: Option<bool>,
    pub max_alternatives: Option<u32>,
}

impl YamlConfig {
    /// Load YAML configuration from a file
    ///
    /// # Errors
    /// `ConfigError::Io` if the file cannot be read, `ConfigError::Yaml`
    /// if it is not valid YAML for this structure.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: YamlConfig = serde_yaml::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_config_full() {
        let yaml = r#"
vosk:
  url: "ws://vosk.lan:2700"
  vol_inc: 7
  timeout_secs: 12
  response_timeout_secs: 4
  language: "en-US"
  words: true
  max_alternatives: 3
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        let vosk = config.vosk.unwrap();

        assert_eq!(vosk.url.as_deref(), Some("ws://vosk.lan:2700"));
        assert_eq!(vosk.vol_inc, Some(7));
        assert_eq!(vosk.timeout_secs, Some(12));
        assert_eq!(vosk.response_timeout_secs, Some(4));
        assert_eq!(vosk.language.as_deref(), Some("en-US"));
        assert_eq!(vosk.words, Some(true));
        assert_eq!(vosk.max_alternatives, Some(3));
    }

    #[test]
    fn test_yaml_config_partial() {
        let yaml = r#"
vosk:
  vosk_url: "ws://vosk.lan:2700"
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        let vosk = config.vosk.unwrap();

        assert_eq!(vosk.url.as_deref(), Some("ws://vosk.lan:2700"));
        assert!(vosk.vol_inc.is_none());
        assert!(vosk.language.is_none());
    }

    #[test]
    fn test_yaml_config_empty() {
        let config: YamlConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.vosk.is_none());
    }

    #[test]
    fn test_yaml_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "vosk:\n  vol_inc: 2\n").unwrap();

        let config = YamlConfig::from_file(&path).unwrap();
        assert_eq!(config.vosk.unwrap().vol_inc, Some(2));
    }
}
