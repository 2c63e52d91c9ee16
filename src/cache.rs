use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{Result, TranslatorError};

/// Key-value store consulted before and updated after each fresh translation.
/// Keys are fingerprints of the original fragment text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheGateway: Send + Sync {
    /// Whether the cache can currently be read
    async fn exists(&self) -> bool;

    async fn get(&self, key: &str) -> Option<String>;

    async fn add(&self, key: &str, value: &str);
}

/// Process-local cache, lost when the batch ends
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the entries, recovering the map if a writer panicked mid-update
    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("Translation cache lock was poisoned, reusing its entries");
            poisoned.into_inner()
        })
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheGateway for MemoryCache {
    async fn exists(&self) -> bool {
        true
    }

    async fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    async fn add(&self, key: &str, value: &str) {
        self.entries().insert(key.to_string(), value.to_string());
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub translation: String,
    pub cached_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CacheInfo {
    pub entries: usize,
    pub total_size: u64,
    pub oldest_entry: Option<DateTime<Utc>>,
    pub newest_entry: Option<DateTime<Utc>>,
}

/// One JSON file per translation under a cache directory.
///
/// Entries are stored as `<fingerprint>.json`. A cache opened with
/// [`FileCache::for_target`] lives in its own subdirectory per target
/// language and model, so the same source text never hits across them.
/// `info` and `clear` cover every subdirectory below the cache directory.
#[derive(Debug, Clone)]
pub struct FileCache {
    cache_dir: PathBuf,
}

impl FileCache {
    pub fn new<P: AsRef<Path>>(cache_dir: P) -> Self {
        let cache_dir = cache_dir.as_ref().to_path_buf();
        if let Err(e) = std::fs::create_dir_all(&cache_dir) {
            warn!("Failed to create translation cache directory: {}", e);
        }
        Self { cache_dir }
    }

    /// Cache for translations into `target_language` made by `model`
    pub fn for_target<P: AsRef<Path>>(root: P, target_language: &str, model: &str) -> Self {
        Self::new(root.as_ref().join(namespace(target_language, model)))
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    fn entry_files(&self) -> Vec<PathBuf> {
        WalkDir::new(&self.cache_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect()
    }

    async fn read_entries(&self) -> Result<Vec<(CacheEntry, u64)>> {
        let mut entries = Vec::new();

        for path in self.entry_files() {
            let size = tokio::fs::metadata(&path).await.map(|m| m.len()).unwrap_or(0);
            let content = tokio::fs::read_to_string(&path).await?;
            match serde_json::from_str::<CacheEntry>(&content) {
                Ok(cache_entry) => entries.push((cache_entry, size)),
                Err(e) => warn!("Skipping unreadable cache entry {}: {}", path.display(), e),
            }
        }

        Ok(entries)
    }

    /// Summarize the cache directory
    pub async fn info(&self) -> Result<CacheInfo> {
        let entries = self.read_entries().await?;

        Ok(CacheInfo {
            entries: entries.len(),
            total_size: entries.iter().map(|(_, size)| size).sum(),
            oldest_entry: entries.iter().map(|(e, _)| e.cached_at).min(),
            newest_entry: entries.iter().map(|(e, _)| e.cached_at).max(),
        })
    }

    /// Remove every cached translation, returning how many were deleted
    pub async fn clear(&self) -> Result<u64> {
        let mut count = 0;

        for path in self.entry_files() {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| TranslatorError::Cache(format!("Failed to remove {}: {}", path.display(), e)))?;
            count += 1;
        }

        info!("Cleared {} translation cache entries", count);
        Ok(count)
    }
}

/// Directory name for one target language and model pair
fn namespace(target_language: &str, model: &str) -> String {
    format!("{}-{}", target_language, model)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
        .collect()
}

#[async_trait]
impl CacheGateway for FileCache {
    async fn exists(&self) -> bool {
        tokio::fs::metadata(&self.cache_dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    async fn get(&self, key: &str) -> Option<String> {
        let content = tokio::fs::read_to_string(self.entry_path(key)).await.ok()?;

        match serde_json::from_str::<CacheEntry>(&content) {
            Ok(entry) => {
                debug!("Translation cache hit: {} (cached at {})", key, entry.cached_at);
                Some(entry.translation)
            }
            Err(e) => {
                warn!("Failed to parse translation cache entry: {}", e);
                None
            }
        }
    }

    async fn add(&self, key: &str, value: &str) {
        let entry = CacheEntry {
            translation: value.to_string(),
            cached_at: Utc::now(),
        };

        let content = match serde_json::to_string_pretty(&entry) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to serialize translation cache entry: {}", e);
                return;
            }
        };

        if let Err(e) = tokio::fs::write(self.entry_path(key), content).await {
            warn!("Failed to write translation cache: {}", e);
        } else {
            debug!("Saved translation to cache: {}", key);
        }
    }
}
