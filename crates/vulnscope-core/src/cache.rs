//! Two-level report cache: file path -> (dependency -> analysis result)

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use lru::LruCache;
use parking_lot::Mutex;

use crate::clock::Clock;
use crate::config::{CacheConfig, ConfigError};
use crate::model::{AnalysisResult, Dependency};

/// Cache entry stamped with its write time
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    written_at: Instant,
}

impl<T> CacheEntry<T> {
    fn new(value: T, written_at: Instant) -> Self {
        CacheEntry { value, written_at }
    }

    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.written_at) >= ttl
    }
}

/// Per-file analysis results. Thread-safe for concurrent access.
///
/// Entries expire `ttl` after they were written. There is no capacity bound;
/// expired entries are dropped lazily on read and swept after each write.
pub struct ReportCache {
    entries: DashMap<Dependency, CacheEntry<AnalysisResult>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ReportCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        ReportCache {
            entries: DashMap::new(),
            ttl,
            clock,
        }
    }

    /// Unexpired entries for the given dependencies. Missing keys are simply
    /// absent from the result.
    pub fn get_present(&self, dependencies: &[Dependency]) -> HashMap<Dependency, AnalysisResult> {
        let now = self.clock.now();
        let mut present = HashMap::with_capacity(dependencies.len());
        let mut expired = Vec::new();

        for dep in dependencies {
            match self.entries.get(dep) {
                Some(entry) if !entry.is_expired(now, self.ttl) => {
                    present.insert(dep.clone(), entry.value.clone());
                }
                Some(_) => expired.push(dep),
                None => {}
            }
        }

        // A concurrent writer may have refreshed the entry since the read.
        for dep in expired {
            self.entries
                .remove_if(dep, |_, entry| entry.is_expired(now, self.ttl));
        }

        present
    }

    /// True when every dependency has an unexpired entry.
    pub fn contains_all(&self, dependencies: &[Dependency]) -> bool {
        let present = self.get_present(dependencies);
        dependencies.iter().all(|dep| present.contains_key(dep))
    }

    /// Insert or overwrite entries. Each written entry starts a fresh TTL.
    pub fn put_all(&self, results: HashMap<Dependency, AnalysisResult>) {
        let now = self.clock.now();
        for (dep, result) in results {
            self.entries.insert(dep, CacheEntry::new(result, now));
        }
        self.purge_expired();
    }

    /// Drop every expired entry.
    pub fn purge_expired(&self) {
        let now = self.clock.now();
        self.entries
            .retain(|_, entry| !entry.is_expired(now, self.ttl));
    }

    /// Number of stored entries, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Maps file paths to their [`ReportCache`].
///
/// Entries expire `ttl` after they were created. At most `capacity` files are
/// tracked; beyond that the least recently used file is evicted.
pub struct FileCache {
    files: Mutex<LruCache<String, CacheEntry<Arc<ReportCache>>>>,
    ttl: Duration,
    report_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl FileCache {
    pub fn new(
        capacity: NonZeroUsize,
        ttl: Duration,
        report_ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        FileCache {
            files: Mutex::new(LruCache::new(capacity)),
            ttl,
            report_ttl,
            clock,
        }
    }

    pub fn from_config(config: &CacheConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        config.validate()?;
        let capacity = NonZeroUsize::new(config.max_files).ok_or(ConfigError::ZeroCapacity)?;
        Ok(Self::new(
            capacity,
            config.file_ttl(),
            config.report_ttl(),
            clock,
        ))
    }

    /// The report cache for `path`, creating it if absent or expired.
    ///
    /// Creation happens under the lock, so concurrent callers for the same
    /// path always receive the same instance.
    pub fn get_or_create(&self, path: &str) -> Arc<ReportCache> {
        let now = self.clock.now();
        let mut files = self.files.lock();

        if let Some(entry) = files.get(path) {
            if !entry.is_expired(now, self.ttl) {
                return Arc::clone(&entry.value);
            }
            tracing::debug!("Report cache for {} expired", path);
        }

        let expired: Vec<String> = files
            .iter()
            .filter(|(_, entry)| entry.is_expired(now, self.ttl))
            .map(|(key, _)| key.clone())
            .collect();
        for key in expired {
            files.pop(&key);
        }

        let reports = Arc::new(ReportCache::new(self.report_ttl, Arc::clone(&self.clock)));
        let entry = CacheEntry::new(Arc::clone(&reports), now);
        if let Some((evicted, _)) = files.push(path.to_string(), entry) {
            if evicted != path {
                tracing::debug!("Evicted report cache for {}", evicted);
            }
        }

        tracing::debug!("Created report cache for {}", path);
        reports
    }

    /// The report cache for `path` if one is tracked and unexpired.
    pub fn get(&self, path: &str) -> Option<Arc<ReportCache>> {
        let now = self.clock.now();
        let mut files = self.files.lock();

        let expired = files.get(path)?.is_expired(now, self.ttl);
        if expired {
            files.pop(path);
            return None;
        }
        files.peek(path).map(|entry| Arc::clone(&entry.value))
    }

    /// Whether `path` is tracked and unexpired. Does not affect recency.
    pub fn contains(&self, path: &str) -> bool {
        let now = self.clock.now();
        self.files
            .lock()
            .peek(path)
            .is_some_and(|entry| !entry.is_expired(now, self.ttl))
    }

    /// Drop the report cache for `path`.
    pub fn invalidate(&self, path: &str) {
        if self.files.lock().pop(path).is_some() {
            tracing::debug!("Invalidated report cache for {}", path);
        }
    }

    /// Drop every tracked file.
    pub fn invalidate_all(&self) {
        self.files.lock().clear();
    }

    /// Number of tracked files, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.files.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.lock().is_empty()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let files = self.files.lock();
        CacheStats {
            tracked_files: files.len(),
            expired_files: files
                .iter()
                .filter(|(_, entry)| entry.is_expired(now, self.ttl))
                .count(),
            cached_reports: files.iter().map(|(_, entry)| entry.value.len()).sum(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub tracked_files: usize,
    pub expired_files: usize,
    pub cached_reports: usize,
}
