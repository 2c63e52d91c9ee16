use tracing::{debug, info};

use crate::error::{Result, TranslatorError};
use super::{Fragment, TranslationSession};

const SEPARATOR: &str = "════════════════════════════════════════";

impl TranslationSession {
    /// Translate every fragment in order.
    ///
    /// Progress is reported before each fragment and once more at
    /// completion. After a fresh (uncached) translation the next request
    /// is delayed by a random pause, except after the last fragment.
    /// A failure aborts the batch; fragments already injected keep their
    /// translation.
    pub async fn handle<F: Fragment>(&mut self, fragments: &mut [F]) -> Result<()> {
        let total = fragments.len();
        if total == 0 {
            return Err(TranslatorError::EmptyBatch);
        }

        self.log(SEPARATOR);
        self.log("Start to translate ebook content:");
        self.log(SEPARATOR);
        self.log(&format!("Total items: {}", total));
        info!("Translating {} fragments to {}", total, self.target_code);

        for (count, fragment) in fragments.iter_mut().enumerate() {
            self.log(&"-".repeat(30));
            self.progress(
                count as f64 / total as f64,
                &format!("Translating: {}/{}", count, total),
            );

            self.translate_fragment(fragment).await?;

            if self.needs_pause && count + 1 < total {
                if let Some(pause) = self.pacing_pause() {
                    debug!("Pausing {}s before next request", pause.as_secs());
                    self.sleeper.sleep(pause).await;
                }
            }
        }

        self.progress(1.0, "Translation completed.");
        info!("Translation of {} fragments completed", total);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheGateway, MemoryCache};
    use crate::glossary::Glossary;
    use crate::progress::testing::{RecordingLog, RecordingProgress};
    use crate::progress::{LogSink, ProgressSink};
    use crate::translate::testing::{EchoBackend, RecordingSleeper, TestFragment};
    use crate::translate::{BackendOutput, TranslationBackend};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    struct Harness {
        session: TranslationSession,
        progress: Arc<RecordingProgress>,
        sleeper: Arc<RecordingSleeper>,
        log: Arc<RecordingLog>,
    }

    fn harness(backend: Arc<dyn TranslationBackend>) -> Harness {
        let progress = Arc::new(RecordingProgress::default());
        let sleeper = Arc::new(RecordingSleeper::default());
        let log = Arc::new(RecordingLog::default());

        let mut session = TranslationSession::new(backend, Glossary::new());
        session.set_progress(Some(progress.clone() as Arc<dyn ProgressSink>));
        session.set_log(Some(log.clone() as Arc<dyn LogSink>));
        session.set_sleeper(sleeper.clone());

        Harness { session, progress, sleeper, log }
    }

    fn fragments(texts: &[&str]) -> Vec<TestFragment> {
        texts.iter().map(|t| TestFragment::new(t)).collect()
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let mut h = harness(Arc::new(EchoBackend::new()));
        let mut empty: Vec<TestFragment> = Vec::new();

        let result = h.session.handle(&mut empty).await;

        assert!(matches!(result, Err(TranslatorError::EmptyBatch)));
        assert!(h.progress.reports.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_single_fragment_is_not_empty() {
        let mut h = harness(Arc::new(EchoBackend::new()));
        let mut batch = fragments(&["only"]);

        h.session.handle(&mut batch).await.unwrap();

        assert_eq!(batch[0].translation(), Some("only"));
        assert!(h.sleeper.pauses().is_empty());
    }

    #[tokio::test]
    async fn test_three_fresh_fragments() {
        let backend = Arc::new(EchoBackend::new());
        let mut h = harness(backend.clone());
        let mut batch = fragments(&["one", "two", "three"]);

        h.session.handle(&mut batch).await.unwrap();

        let reports = h.progress.reports.lock().unwrap().clone();
        assert_eq!(
            reports,
            vec![
                (0.0, "Translating: 0/3".to_string()),
                (1.0 / 3.0, "Translating: 1/3".to_string()),
                (2.0 / 3.0, "Translating: 2/3".to_string()),
                (1.0, "Translation completed.".to_string()),
            ]
        );

        let pauses = h.sleeper.pauses();
        assert_eq!(pauses.len(), 2);
        assert!(pauses.iter().all(|p| *p >= Duration::from_secs(1) && *p <= Duration::from_secs(5)));

        assert_eq!(backend.calls(), 3);
        let translated: Vec<_> = batch.iter().map(|f| f.translation().unwrap()).collect();
        assert_eq!(translated, vec!["one", "two", "three"]);
        assert!(h.log.contains("Total items: 3"));
    }

    #[tokio::test]
    async fn test_cached_fragments_are_not_paced() {
        let backend = Arc::new(EchoBackend::new());
        let mut h = harness(backend.clone());
        h.session.set_request_interval(1);
        h.session.set_cache(Some(Arc::new(MemoryCache::new()) as Arc<dyn CacheGateway>));
        let mut batch = fragments(&["repeat", "repeat", "fresh", "repeat"]);

        h.session.handle(&mut batch).await.unwrap();

        assert_eq!(backend.calls(), 2);
        // Fresh translations at 0 and 2 pause; cache hits at 1 and 3 do not.
        assert_eq!(h.sleeper.pauses(), vec![Duration::from_secs(1); 2]);
        assert!(h.log.contains("Translation (Cached): repeat"));
    }

    #[tokio::test]
    async fn test_zero_interval_disables_pacing() {
        let mut h = harness(Arc::new(EchoBackend::new()));
        h.session.set_request_interval(0);
        let mut batch = fragments(&["a", "b", "c"]);

        h.session.handle(&mut batch).await.unwrap();
        assert!(h.sleeper.pauses().is_empty());
    }

    struct RefusesBoom;

    #[async_trait]
    impl TranslationBackend for RefusesBoom {
        async fn translate(&self, text: &str) -> crate::error::Result<BackendOutput> {
            if text.contains("boom") {
                Err(TranslatorError::Backend("quota exceeded".to_string()))
            } else {
                Ok(BackendOutput::Complete(text.to_uppercase()))
            }
        }

        fn target_code(&self) -> &str {
            "up"
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(10)
        }
    }

    #[tokio::test]
    async fn test_exhaustion_aborts_batch_keeping_earlier_output() {
        let mut h = harness(Arc::new(RefusesBoom));
        h.session.set_request_attempt(1);
        h.session.set_request_interval(2);
        let mut batch = fragments(&["ok", "boom", "never"]);

        let error = h.session.handle(&mut batch).await.unwrap_err();

        assert!(matches!(error, TranslatorError::BackendExhausted { attempts: 2, .. }));
        assert_eq!(batch[0].translation(), Some("OK"));
        assert!(batch[1].injected.is_none());
        assert!(batch[2].injected.is_none());

        // One pacing pause after "ok", then one retry backoff of 5s.
        let pauses = h.sleeper.pauses();
        assert_eq!(pauses.len(), 2);
        assert_eq!(pauses[1], Duration::from_secs(5));

        let reports = h.progress.reports.lock().unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|(fraction, _)| *fraction < 1.0));
    }
}
