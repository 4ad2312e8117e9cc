//! Cache backend adapter.
//!
//! This module defines the narrow contract the store needs from a cache
//! backend, so in-process maps, distributed caches, or databases can be
//! swapped without touching session logic. Each call is expected to be
//! atomic on its own; nothing here spans a read and a later write.

use async_trait::async_trait;

use crate::error::Result;

/// Trait for cache backends.
///
/// Implementations report backend failures (unreachable server, I/O errors)
/// as [`Error::StoreUnavailable`](crate::Error::StoreUnavailable). Retry
/// policy, if any, lives here or in the caller; the store never retries.
#[async_trait]
pub trait CacheAdapter: Send + Sync + std::fmt::Debug {
    /// Fetch the raw bytes stored under `key`.
    ///
    /// Returns `Ok(None)` if the key is absent or has expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key` for `ttl_secs` seconds.
    ///
    /// How a TTL of `0` is treated is up to the backend.
    async fn set(&self, key: &str, value: Vec<u8>, ttl_secs: u64) -> Result<()>;
}

