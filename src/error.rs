use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslatorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("The specified glossary file does not exist: {}", .path.display())]
    GlossaryFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Translation engine error: {0}")]
    Backend(String),

    #[error("Failed to retrieve data from translate engine API after {attempts} attempts. {source}")]
    BackendExhausted {
        attempts: u32,
        #[source]
        source: Box<TranslatorError>,
    },

    #[error("There is no content need to translate.")]
    EmptyBatch,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cache error: {0}")]
    Cache(String),
}

pub type Result<T> = std::result::Result<T, TranslatorError>;
