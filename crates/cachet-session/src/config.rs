//! Configuration for the session store.

use crate::memory::DEFAULT_MAX_ENTRIES;

/// Default time-to-live for stored sessions, in seconds (1 hour).
pub const DEFAULT_TIMEOUT_SECS: u64 = 3600;

/// Configuration for the session store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Optional prefix prepended to every session id to form the cache key.
    pub prefix: Option<String>,

    /// Time-to-live passed to the cache backend on every write.
    pub timeout_secs: u64,

    /// Capacity of the in-process backend, when one is used.
    pub max_entries: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            prefix: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl StoreConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cache key prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set the record TTL in seconds.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the in-process backend capacity.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }
}
