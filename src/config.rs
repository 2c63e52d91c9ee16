use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, TranslatorError};

fn default_request_attempt() -> u32 {
    3
}

fn default_request_interval() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub glossary: GlossaryConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Language code the translation is tagged with
    pub target_language: String,
    /// Where the translation goes relative to the original text
    #[serde(default)]
    pub position: Position,
    /// CSS color for the injected translation
    #[serde(default)]
    pub color: Option<String>,
    /// Number of retries after a failed backend call
    #[serde(default = "default_request_attempt")]
    pub request_attempt: u32,
    /// Upper bound (seconds) of the random pause between fresh translations
    #[serde(default = "default_request_interval")]
    pub request_interval: u64,
    /// Log original and translated text of every fragment
    #[serde(default = "default_true")]
    pub log_translation: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// Translation follows the original
    #[default]
    After,
    /// Translation precedes the original
    Before,
    /// Translation replaces the original
    Only,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlossaryConfig {
    pub enabled: bool,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Directory holding one JSON file per cached translation
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Ollama endpoint URL
    pub endpoint: String,
    /// LLM model to use for translation
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Request a streaming response
    #[serde(default)]
    pub stream: bool,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            target_language: "ja".to_string(),
            position: Position::After,
            color: None,
            request_attempt: default_request_attempt(),
            request_interval: default_request_interval(),
            log_translation: true,
        }
    }
}

impl Default for GlossaryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from("glossary.txt"),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: PathBuf::from(".fragment-translator/cache/translations"),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.2:3b".to_string(),
            timeout_secs: 300,
            stream: false,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TranslatorError::Config(format!("Failed to read config file: {}", e)))?;

        Ok(toml::from_str(&content)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| TranslatorError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| TranslatorError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            "[translation]\ntarget_language = \"fr\"\nposition = \"only\"\n",
        )
        .unwrap();

        assert_eq!(config.translation.target_language, "fr");
        assert_eq!(config.translation.position, Position::Only);
        assert_eq!(config.translation.request_attempt, 3);
        assert_eq!(config.translation.request_interval, 5);
        assert!(config.translation.log_translation);
        assert!(config.cache.enabled);
        assert!(!config.glossary.enabled);
        assert_eq!(config.backend.timeout_secs, 300);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.translation.color = Some("#666666".to_string());
        config.glossary.enabled = true;
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.translation.color.as_deref(), Some("#666666"));
        assert!(loaded.glossary.enabled);
        assert_eq!(loaded.backend.model, "llama3.2:3b");
    }

    #[test]
    fn test_invalid_position_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[translation]\ntarget_language = \"de\"\nposition = \"sideways\"\n").unwrap();

        assert!(matches!(Config::from_file(&path), Err(TranslatorError::Toml(_))));
    }

    #[test]
    fn test_malformed_file_is_a_toml_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[translation\ntarget_language = ").unwrap();

        let error = Config::from_file(&path).unwrap_err();
        assert!(matches!(error, TranslatorError::Toml(_)));
        assert!(error.to_string().starts_with("TOML parsing error"));
    }

    #[test]
    fn test_missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::from_file(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(TranslatorError::Config(_))));
    }
}
