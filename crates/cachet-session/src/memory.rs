//! In-process cache backend with LRU eviction and per-entry TTL.

use std::num::NonZeroUsize;
use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::adapter::CacheAdapter;
use crate::error::Result;
use crate::ttl::ExpiryTracker;

/// Default maximum number of entries held before LRU eviction.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Inner state protected by a mutex.
struct MemoryInner {
    lru: LruCache<String, Vec<u8>>,
    expiry: ExpiryTracker,
}

impl MemoryInner {
    /// Drop `key` if its deadline has passed.
    fn evict_if_expired(&mut self, key: &str) {
        if self.expiry.is_expired(key) {
            debug!(key = %key, "Entry expired, removing from cache");
            self.lru.pop(key);
            self.expiry.remove(key);
        }
    }
}

/// In-process [`CacheAdapter`] for single-node deployments and tests.
///
/// Provides:
/// - LRU eviction when the capacity is reached
/// - Per-entry TTL fixed at write time; a TTL of `0`, or one too large
///   for the clock, means no expiry
/// - Lazy expiry on access plus an explicit [`purge_expired`](Self::purge_expired)
///
/// Never fails, so it never reports `StoreUnavailable`.
pub struct MemoryCache {
    inner: Mutex<MemoryInner>,
    capacity: usize,
}

impl MemoryCache {
    /// Create a cache with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    /// Create a cache holding at most `max_entries` entries.
    pub fn with_capacity(max_entries: usize) -> Self {
        let cap = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(MemoryInner {
                lru: LruCache::new(cap),
                expiry: ExpiryTracker::new(),
            }),
            capacity: cap.get(),
        }
    }

    /// Current number of entries, expired or not.
    pub fn len(&self) -> usize {
        self.inner.lock().lru.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().lru.is_empty()
    }

    /// Check if a live entry exists for `key` (without touching LRU order).
    pub fn contains(&self, key: &str) -> bool {
        let inner = self.inner.lock();
        inner.lru.contains(key) && !inner.expiry.is_expired(key)
    }

    /// Remove every expired entry and return how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let mut inner = self.inner.lock();
        let expired = inner.expiry.drain_expired();
        let mut count = 0;
        for key in expired {
            if inner.lru.pop(&key).is_some() {
                count += 1;
            }
        }

        if count > 0 {
            debug!(count = count, "Purged expired cache entries");
        }

        count
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            size: inner.lru.len(),
            capacity: self.capacity,
            ttl_tracked: inner.expiry.len(),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("capacity", &self.capacity)
            .field("size", &self.len())
            .finish()
    }
}

#[async_trait]
impl CacheAdapter for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut inner = self.inner.lock();
        inner.evict_if_expired(key);
        let value = inner.lru.get(key).cloned();
        trace!(key = %key, hit = value.is_some(), "Cache get");
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl_secs: u64) -> Result<()> {
        let mut inner = self.inner.lock();

        let ttl = (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs));
        if let Some((evicted, _)) = inner.lru.push(key.to_string(), value) {
            if evicted != key {
                debug!(key = %evicted, "Evicting LRU entry to make room");
                inner.expiry.remove(&evicted);
            }
        }
        inner.expiry.set(key, ttl);

        trace!(
            key = %key,
            ttl_secs = ttl_secs,
            cache_size = inner.lru.len(),
            "Cache set"
        );

        Ok(())
    }
}

/// Cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Current number of entries.
    pub size: usize,

    /// Maximum capacity.
    pub capacity: usize,

    /// Number of entries carrying an expiry deadline.
    pub ttl_tracked: usize,
}
