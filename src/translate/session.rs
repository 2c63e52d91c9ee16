use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::cache::{CacheGateway, FileCache};
use crate::config::Config;
use crate::error::Result;
use crate::glossary::Glossary;
use crate::progress::{LogSink, ProgressSink};
use super::{Position, RetryController, Sleeper, TokioSleeper, TranslationBackend};

/// Configuration and run state of one batch translation job.
///
/// Collaborators (cache, progress, log) are optional; when absent the
/// corresponding step is skipped.
pub struct TranslationSession {
    pub(super) backend: Arc<dyn TranslationBackend>,
    pub(super) glossary: Glossary,
    pub(super) target_code: String,
    pub(super) position: Position,
    pub(super) color: Option<String>,
    pub(super) request_attempt: u32,
    pub(super) request_interval: u64,
    pub(super) log_translation: bool,
    pub(super) cache: Option<Arc<dyn CacheGateway>>,
    pub(super) progress: Option<Arc<dyn ProgressSink>>,
    pub(super) log: Option<Arc<dyn LogSink>>,
    pub(super) sleeper: Arc<dyn Sleeper>,
    pub(super) needs_pause: bool,
}

impl TranslationSession {
    pub fn new(backend: Arc<dyn TranslationBackend>, glossary: Glossary) -> Self {
        let target_code = backend.target_code().to_string();
        Self {
            backend,
            glossary,
            target_code,
            position: Position::After,
            color: None,
            request_attempt: 3,
            request_interval: 5,
            log_translation: true,
            cache: None,
            progress: None,
            log: None,
            sleeper: Arc::new(TokioSleeper),
            needs_pause: false,
        }
    }

    /// Build a session from configuration, loading the glossary when enabled
    pub fn from_config(config: &Config, backend: Arc<dyn TranslationBackend>) -> Result<Self> {
        let glossary = if config.glossary.enabled {
            Glossary::load(&config.glossary.path)?
        } else {
            Glossary::new()
        };

        let mut session = Self::new(backend, glossary);
        let translation = &config.translation;
        session.set_target_code(&translation.target_language);
        session.set_position(translation.position);
        session.set_color(translation.color.clone());
        session.set_request_attempt(translation.request_attempt);
        session.set_request_interval(translation.request_interval);
        session.set_log_translation(translation.log_translation);

        if config.cache.enabled {
            let cache = FileCache::for_target(
                &config.cache.directory,
                &translation.target_language,
                &config.backend.model,
            );
            info!("Using translation cache at {}", cache.cache_dir().display());
            session.set_cache(Some(Arc::new(cache)));
        }

        Ok(session)
    }

    pub fn set_target_code(&mut self, code: &str) {
        self.target_code = code.to_string();
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn set_color(&mut self, color: Option<String>) {
        self.color = color.filter(|c| !c.trim().is_empty());
    }

    pub fn set_request_attempt(&mut self, limit: u32) {
        self.request_attempt = limit;
    }

    pub fn set_request_interval(&mut self, max_seconds: u64) {
        self.request_interval = max_seconds;
    }

    pub fn set_log_translation(&mut self, enabled: bool) {
        self.log_translation = enabled;
    }

    pub fn set_cache(&mut self, cache: Option<Arc<dyn CacheGateway>>) {
        self.cache = cache;
    }

    pub fn set_progress(&mut self, progress: Option<Arc<dyn ProgressSink>>) {
        self.progress = progress;
    }

    pub fn set_log(&mut self, log: Option<Arc<dyn LogSink>>) {
        self.log = log;
    }

    pub fn set_sleeper(&mut self, sleeper: Arc<dyn Sleeper>) {
        self.sleeper = sleeper;
    }

    pub fn target_code(&self) -> &str {
        &self.target_code
    }

    pub fn glossary(&self) -> &Glossary {
        &self.glossary
    }

    /// Whether the last fragment was freshly translated and the next request should wait
    pub fn needs_pause(&self) -> bool {
        self.needs_pause
    }

    pub(super) fn progress(&self, fraction: f64, message: &str) {
        if let Some(progress) = &self.progress {
            progress.report(fraction, message);
        }
    }

    pub(super) fn log(&self, message: &str) {
        if let Some(log) = &self.log {
            log.info(message);
        }
    }

    pub(super) fn retry_controller(&self) -> RetryController {
        RetryController::new(self.request_attempt)
            .with_sleeper(self.sleeper.clone())
            .with_log(self.log.clone())
    }

    /// Random pacing pause in `[1, request_interval]` seconds
    pub(super) fn pacing_pause(&self) -> Option<Duration> {
        if self.request_interval == 0 {
            return None;
        }
        let seconds = rand::rng().random_range(1..=self.request_interval);
        Some(Duration::from_secs(seconds))
    }
}
