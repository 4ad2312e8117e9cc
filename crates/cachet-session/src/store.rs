//! Encrypted, TTL-bounded key/value store over a cache backend.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{trace, warn};

use crate::adapter::CacheAdapter;
use crate::config::DEFAULT_TIMEOUT_SECS;
use crate::crypto::DataEncrypter;
use crate::error::{Error, Result};

/// Typed store that serializes, encrypts and writes values through a
/// [`CacheAdapter`].
///
/// Values are encoded as JSON before encryption. On read, a record that
/// cannot be decrypted or decoded is logged and treated as absent, so one
/// corrupt entry never fails an otherwise healthy request. Backend failures
/// are not swallowed: they surface as [`Error::StoreUnavailable`].
pub struct EncryptedCacheStore<K, V> {
    cache: Arc<dyn CacheAdapter>,
    encrypter: Arc<dyn DataEncrypter>,
    timeout_secs: u64,
    _marker: PhantomData<fn(K) -> V>,
}

impl<K, V> EncryptedCacheStore<K, V>
where
    K: AsRef<str>,
    V: Serialize + DeserializeOwned,
{
    /// Create a store with the default TTL of one hour.
    pub fn new(cache: Arc<dyn CacheAdapter>, encrypter: Arc<dyn DataEncrypter>) -> Self {
        Self {
            cache,
            encrypter,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            _marker: PhantomData,
        }
    }

    /// Set the TTL used by subsequent writes.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// TTL in seconds passed to the backend on every write.
    pub fn timeout(&self) -> u64 {
        self.timeout_secs
    }

    /// Change the TTL for subsequent writes. Existing records keep theirs.
    pub fn set_timeout(&mut self, secs: u64) {
        self.timeout_secs = secs;
    }

    /// Load and decode the value stored under `key`.
    pub async fn get(&self, key: &K) -> Result<Option<V>> {
        let key = key.as_ref();
        let raw = self.cache.get(key).await?;

        let plain = match self.encrypter.decrypt(raw.as_deref()) {
            Ok(Some(plain)) => plain,
            Ok(None) => {
                trace!(key = %key, "No record in cache");
                return Ok(None);
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Undecryptable record, treating as absent");
                return Ok(None);
            }
        };

        match serde_json::from_slice(&plain) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                let err = Error::MalformedRecord {
                    key: key.to_string(),
                    reason: e.to_string(),
                };
                warn!(error = %err, "Treating record as absent");
                Ok(None)
            }
        }
    }

    /// Encode, encrypt and write `value` under `key` with the configured TTL.
    pub async fn set(&self, key: &K, value: &V) -> Result<()> {
        let key = key.as_ref();
        let plain = serde_json::to_vec(value)?;
        let Some(cipher) = self.encrypter.encrypt(Some(plain.as_slice()))? else {
            return Err(Error::Encryption(
                "encrypter returned no output".to_string(),
            ));
        };

        trace!(key = %key, bytes = cipher.len(), ttl_secs = self.timeout_secs, "Writing record");
        self.cache.set(key, cipher, self.timeout_secs).await
    }
}

impl<K, V> fmt::Debug for EncryptedCacheStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedCacheStore")
            .field("cache", &self.cache)
            .field("encrypter", &self.encrypter)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
