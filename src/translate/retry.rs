use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Result, TranslatorError};
use crate::progress::LogSink;
use super::{Sleeper, TokioSleeper, TranslationBackend};

pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// Wraps a single backend call with bounded linear backoff.
///
/// Attempt 0 calls the backend directly. Each failure below the limit
/// waits `interval * attempt` before trying again, so a limit of `N`
/// allows at most `N + 1` calls.
#[derive(Clone)]
pub struct RetryController {
    limit: u32,
    interval: Duration,
    sleeper: Arc<dyn Sleeper>,
    log: Option<Arc<dyn LogSink>>,
}

impl RetryController {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            interval: DEFAULT_RETRY_INTERVAL,
            sleeper: Arc::new(TokioSleeper),
            log: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_log(mut self, log: Option<Arc<dyn LogSink>>) -> Self {
        self.log = log;
        self
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Pause taken before retry number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.interval * attempt
    }

    fn log(&self, message: &str) {
        if let Some(log) = &self.log {
            log.info(message);
        }
    }

    /// Translate `text`, draining streamed output into one string
    pub async fn translate(&self, backend: &dyn TranslationBackend, text: &str) -> Result<String> {
        let mut attempt = 0;

        loop {
            let result = match backend.translate(text).await {
                Ok(output) => output.collect().await,
                Err(e) => Err(e),
            };

            let error = match result {
                Ok(translation) => {
                    if attempt > 0 {
                        debug!("Backend succeeded after {} retries", attempt);
                    }
                    return Ok(translation);
                }
                Err(e) => e,
            };

            let message = "Failed to retrieve data from translate engine API.";
            if attempt >= self.limit {
                warn!("{} Giving up after {} attempts: {}", message, attempt + 1, error);
                return Err(TranslatorError::BackendExhausted {
                    attempts: attempt + 1,
                    source: Box::new(error),
                });
            }

            attempt += 1;
            let pause = self.backoff(attempt);
            warn!("Attempt {}/{} failed: {}", attempt, self.limit + 1, error);
            self.log(message);
            self.log(&format!("Will retry in {} seconds.", pause.as_secs()));

            self.sleeper.sleep(pause).await;

            self.log(&format!(
                "Retrying ... (timeout is {} seconds).",
                backend.timeout().as_secs()
            ));
        }
    }
}
