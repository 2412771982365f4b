//! Bounded LRU cache of session details.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use tokio::sync::Mutex;
use tracing::trace;

use sessionhub_entity::token::{AuthToken, SessionDetails, model::fingerprint};

/// Counters describing cache effectiveness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Entries dropped to make room for new ones.
    pub evictions: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

/// Fixed-capacity map from token string to [`SessionDetails`].
///
/// Both `get` and `put` count as an access for recency. Inserting a new
/// token into a full cache evicts the least-recently-accessed entry first.
/// Safe to share between request handlers; clones share the same storage.
#[derive(Debug, Clone)]
pub struct BoundedTokenCache {
    entries: Arc<Mutex<LruCache<String, SessionDetails>>>,
    counters: Arc<Counters>,
    capacity: NonZeroUsize,
}

impl BoundedTokenCache {
    /// Create a cache holding at most `capacity` sessions (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);

        Self {
            entries: Arc::new(Mutex::new(LruCache::new(capacity))),
            counters: Arc::new(Counters::default()),
            capacity,
        }
    }

    /// Look up a token, marking it most recently used.
    pub async fn get(&self, token: &str) -> Option<SessionDetails> {
        let mut entries = self.entries.lock().await;
        match entries.get(token) {
            Some(details) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                Some(details.clone())
            }
            None => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insert or replace the details for a token.
    pub async fn put(&self, token: String, details: SessionDetails) {
        let mut entries = self.entries.lock().await;
        if let Some((evicted, _)) = entries.push(token.clone(), details) {
            if evicted != token {
                self.counters.evictions.fetch_add(1, Ordering::Relaxed);
                trace!(token = fingerprint(&evicted), "Evicted least recently used session");
            }
        }
    }

    /// Adopt the expiry window of `record` into an existing entry.
    ///
    /// Does nothing if the entry is gone, so a concurrent removal is never
    /// undone. Returns whether an entry was updated.
    pub async fn refresh(&self, record: &AuthToken) -> bool {
        let mut entries = self.entries.lock().await;
        match entries.get_mut(record.token.as_str()) {
            Some(details) => {
                details.adopt(record);
                true
            }
            None => false,
        }
    }

    /// Remove a token. Returns whether it was present.
    pub async fn remove(&self, token: &str) -> bool {
        self.entries.lock().await.pop(token).is_some()
    }

    /// Whether a token is cached, without touching recency.
    pub async fn contains(&self, token: &str) -> bool {
        self.entries.lock().await.contains(token)
    }

    /// Number of cached sessions.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether the cache holds no sessions.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Fixed capacity chosen at construction.
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Snapshot of hit/miss/eviction counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
        }
    }
}
