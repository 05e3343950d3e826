use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// Default number of titles kept in the positive cache.
pub const DEFAULT_CAPACITY: usize = 200;

/// Default cool-down before a failed lookup may be retried.
pub const DEFAULT_NEGATIVE_TTL: Duration = Duration::from_secs(10 * 60);

/// A remembered failed lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct NegativeEntry {
    pub status: Option<u16>,
    pub error: Option<String>,
    pub expires_at: Instant,
}

impl NegativeEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Default)]
struct CacheInner {
    /// Least recently used at the front.
    titles: VecDeque<(String, String)>,
    failures: HashMap<String, NegativeEntry>,
}

/// Positive (LRU) and negative (TTL) caches for canonical title lookups.
///
/// One instance per pipeline; share it by `Arc`. The lock is never held
/// across an `.await`.
#[derive(Debug)]
pub struct TitleCache {
    inner: Mutex<CacheInner>,
    capacity: usize,
    negative_ttl: Duration,
}

impl Default for TitleCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_NEGATIVE_TTL)
    }
}

impl TitleCache {
    pub fn new(capacity: usize, negative_ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            capacity: capacity.max(1),
            negative_ttl,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a cached title, marking it most recently used.
    pub fn get_title(&self, video_id: &str) -> Option<String> {
        let mut inner = self.lock();
        let pos = inner.titles.iter().position(|(id, _)| id == video_id)?;
        let entry = inner.titles.remove(pos)?;
        let title = entry.1.clone();
        inner.titles.push_back(entry);
        Some(title)
    }

    /// Cache a fetched title and forget any earlier failure for the ID.
    pub fn put_title(&self, video_id: &str, title: &str) {
        let mut inner = self.lock();
        if let Some(pos) = inner.titles.iter().position(|(id, _)| id == video_id) {
            inner.titles.remove(pos);
        } else if inner.titles.len() >= self.capacity {
            inner.titles.pop_front();
        }
        inner
            .titles
            .push_back((video_id.to_string(), title.to_string()));
        inner.failures.remove(video_id);
    }

    /// Look up an unexpired failure. Expired entries are dropped on the way.
    pub fn get_failure(&self, video_id: &str) -> Option<NegativeEntry> {
        let mut inner = self.lock();
        let entry = inner.failures.get(video_id)?;
        if entry.is_expired(Instant::now()) {
            inner.failures.remove(video_id);
            return None;
        }
        Some(entry.clone())
    }

    /// Remember a failed lookup until the negative TTL elapses.
    ///
    /// Expired entries for other IDs are swept on the way.
    pub fn put_failure(&self, video_id: &str, status: Option<u16>, error: Option<String>) {
        let now = Instant::now();
        let entry = NegativeEntry {
            status,
            error,
            expires_at: now + self.negative_ttl,
        };
        let mut inner = self.lock();
        inner.failures.retain(|_, e| !e.is_expired(now));
        inner.failures.insert(video_id.to_string(), entry);
    }

    pub fn len(&self) -> usize {
        self.lock().titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of stored failures, expired or not.
    pub fn negative_len(&self) -> usize {
        self.lock().failures.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.titles.clear();
        inner.failures.clear();
    }
}
