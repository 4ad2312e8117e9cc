//! Per-entry expiry tracking for the in-process cache.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

/// Tracks expiry deadlines for cache entries.
///
/// Each entry carries its own deadline, fixed at write time. Entries written
/// with no TTL are never tracked and so never expire.
#[derive(Debug, Default)]
pub struct ExpiryTracker {
    deadlines: HashMap<String, Instant>,
}

impl ExpiryTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a write for `key`. `None` clears any previous deadline.
    ///
    /// A TTL whose deadline is past the clock's range is treated like `None`.
    pub fn set(&mut self, key: &str, ttl: Option<Duration>) {
        match ttl.and_then(|ttl| Instant::now().checked_add(ttl)) {
            Some(deadline) => {
                self.deadlines.insert(key.to_string(), deadline);
            }
            None => {
                self.deadlines.remove(key);
            }
        }
    }

    /// Check if `key` is past its deadline.
    pub fn is_expired(&self, key: &str) -> bool {
        self.deadlines
            .get(key)
            .is_some_and(|deadline| Instant::now() >= *deadline)
    }

    /// Stop tracking `key`.
    pub fn remove(&mut self, key: &str) {
        self.deadlines.remove(key);
    }

    /// Remove all expired entries and return their keys.
    pub fn drain_expired(&mut self) -> Vec<String> {
        let now = Instant::now();
        let expired: Vec<String> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| now >= **deadline)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            self.deadlines.remove(key);
        }
        expired
    }

    /// Number of entries with a deadline.
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    /// Check if no entries are tracked.
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}
