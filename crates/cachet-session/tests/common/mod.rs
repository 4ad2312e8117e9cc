//! Test doubles for cache backends.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use cachet_session::{
    AesDataEncrypter, CacheAdapter, Error, MemoryCache, Result, SessionStore, StoreConfig,
};
use parking_lot::Mutex;
use tokio::sync::Barrier;

/// Build a store over `cache` with a fresh random key.
pub fn store_over(cache: Arc<dyn CacheAdapter>, config: &StoreConfig) -> SessionStore {
    SessionStore::with_config(cache, Arc::new(AesDataEncrypter::generate()), config)
}

/// One recorded `set` call.
#[derive(Debug, Clone)]
pub struct SetCall {
    pub key: String,
    pub ttl_secs: u64,
}

/// In-memory cache that records every write.
#[derive(Debug, Default)]
pub struct RecordingCache {
    inner: MemoryCache,
    sets: Mutex<Vec<SetCall>>,
}

impl RecordingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sets(&self) -> Vec<SetCall> {
        self.sets.lock().clone()
    }

    /// Overwrite a key with raw bytes, bypassing encryption.
    pub async fn inject(&self, key: &str, bytes: Vec<u8>) {
        self.inner.set(key, bytes, 0).await.unwrap();
    }

    pub async fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.get(key).await.unwrap()
    }
}

#[async_trait]
impl CacheAdapter for RecordingCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl_secs: u64) -> Result<()> {
        self.sets.lock().push(SetCall {
            key: key.to_string(),
            ttl_secs,
        });
        self.inner.set(key, value, ttl_secs).await
    }
}

/// Backend that is always unreachable.
#[derive(Debug, Default)]
pub struct DownCache;

#[async_trait]
impl CacheAdapter for DownCache {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        Err(Error::StoreUnavailable("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl_secs: u64) -> Result<()> {
        Err(Error::StoreUnavailable("connection refused".to_string()))
    }
}

/// Cache whose first `gated` reads wait on a shared barrier, forcing
/// concurrent callers to all finish reading before any of them writes.
#[derive(Debug)]
pub struct GatedCache {
    inner: MemoryCache,
    barrier: Barrier,
    gated: usize,
    reads: AtomicUsize,
}

impl GatedCache {
    pub fn new(gated: usize) -> Self {
        Self {
            inner: MemoryCache::new(),
            barrier: Barrier::new(gated),
            gated,
            reads: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CacheAdapter for GatedCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self.inner.get(key).await?;
        if self.reads.fetch_add(1, Ordering::SeqCst) < self.gated {
            self.barrier.wait().await;
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl_secs: u64) -> Result<()> {
        self.inner.set(key, value, ttl_secs).await
    }
}
