// Translation orchestration
//
// - retry: bounded linear backoff around a single backend call
// - session: configuration and run state for one batch job
// - fragment: cache lookup, glossary substitution and injection for one fragment
// - batch: sequential processing of every fragment with progress and pacing
// - ollama: translation backend talking to an Ollama server

pub mod batch;
pub mod common;
pub mod fragment;
pub mod ollama;
pub mod retry;
pub mod session;

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use std::time::Duration;

pub use crate::config::Position;
use crate::error::Result;
pub use retry::RetryController;
pub use session::TranslationSession;

/// What a backend hands back for one request
pub enum BackendOutput {
    Complete(String),
    /// Chunks arrive lazily and are concatenated in order
    Stream(BoxStream<'static, Result<String>>),
}

impl BackendOutput {
    /// Drain the output into a single string
    pub async fn collect(self) -> Result<String> {
        match self {
            Self::Complete(text) => Ok(text),
            Self::Stream(mut chunks) => {
                let mut text = String::new();
                while let Some(chunk) = chunks.next().await {
                    text.push_str(&chunk?);
                }
                Ok(text)
            }
        }
    }
}

impl From<String> for BackendOutput {
    fn from(text: String) -> Self {
        Self::Complete(text)
    }
}

/// Performs the actual text translation
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    async fn translate(&self, text: &str) -> Result<BackendOutput>;

    /// Language code of the produced translation
    fn target_code(&self) -> &str;

    /// Request timeout enforced by the backend itself
    fn timeout(&self) -> Duration;
}

/// A content unit owned by the document layer
pub trait Fragment {
    /// Plain text of the original content
    fn content(&self) -> String;

    /// Attach a translation (already XML escaped) to the fragment
    fn inject(&mut self, translation: &str, target_code: &str, position: Position, color: Option<&str>);
}

/// Blocking point of the orchestration: retry backoff and request pacing
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
