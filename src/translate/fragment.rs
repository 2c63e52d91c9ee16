use tracing::debug;

use crate::error::Result;
use super::common::{escape_xml, fingerprint, normalize_whitespace};
use super::{Fragment, TranslationSession};

impl TranslationSession {
    /// Translate one fragment and inject the result into it.
    ///
    /// A cache hit skips the backend entirely and clears `needs_pause`.
    /// A fresh translation goes through glossary substitution and the
    /// retry controller, is whitespace-normalized, XML escaped and
    /// restored, then cached; it sets `needs_pause`.
    pub async fn translate_fragment<F: Fragment + ?Sized>(&mut self, fragment: &mut F) -> Result<()> {
        let original = fragment.content();
        if self.log_translation {
            self.log(&format!("Original: {}", original));
        }

        let key = fingerprint(&original);
        let mut cached = None;
        if let Some(cache) = &self.cache {
            if cache.exists().await {
                cached = cache.get(&key).await;
            }
        }

        let translation = match cached {
            Some(translation) => {
                debug!("Cache hit for fragment {}", key);
                if self.log_translation {
                    self.log(&format!("Translation (Cached): {}", translation));
                }
                self.needs_pause = false;
                translation
            }
            None => {
                let substituted = self.glossary.replace(&original);
                let raw = self
                    .retry_controller()
                    .translate(self.backend.as_ref(), &substituted)
                    .await?;
                let translation = self.glossary.restore(&escape_xml(&normalize_whitespace(&raw)));

                if let Some(cache) = &self.cache {
                    cache.add(&key, &translation).await;
                }
                if self.log_translation {
                    self.log(&format!("Translation: {}", translation));
                }
                self.needs_pause = true;
                translation
            }
        };

        fragment.inject(
            &translation,
            &self.target_code,
            self.position,
            self.color.as_deref(),
        );
        Ok(())
    }
}
