//! Configuration types.
//!
//! Every field is optional in the file so layers can be merged; the
//! accessors on [`SessionConfig`] fill in defaults.

use cachet_session::{DEFAULT_MAX_ENTRIES, DEFAULT_TIMEOUT_SECS, StoreConfig};
use serde::{Deserialize, Serialize};

/// Root configuration (`config.toml` / `cachet.toml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CachetConfig {
    /// The `[session]` table.
    #[serde(default)]
    pub session: SessionConfig,
}

impl CachetConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration with every defaulted field spelled out.
    pub fn with_defaults() -> Self {
        Self {
            session: SessionConfig {
                timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
                max_entries: Some(DEFAULT_MAX_ENTRIES),
                ..SessionConfig::default()
            },
        }
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: CachetConfig) {
        self.session.merge(other.session);
    }
}

/// Session store settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Cache key prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Record TTL in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Capacity of the in-process backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<usize>,

    /// Base64 encryption key. Prefer `CACHET_ENCRYPTION_KEY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_key: Option<String>,
}

impl SessionConfig {
    /// Record TTL, defaulting to one hour.
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    /// In-process backend capacity, defaulting to 10 000 entries.
    pub fn max_entries(&self) -> usize {
        self.max_entries.unwrap_or(DEFAULT_MAX_ENTRIES)
    }

    /// Whether an encryption key is written in the file itself.
    pub fn has_plaintext_key(&self) -> bool {
        self.encryption_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Build the store configuration these settings describe.
    pub fn store_config(&self) -> StoreConfig {
        let config = StoreConfig::new()
            .with_timeout(self.timeout_secs())
            .with_max_entries(self.max_entries());
        match &self.prefix {
            Some(prefix) => config.with_prefix(prefix.clone()),
            None => config,
        }
    }

    fn merge(&mut self, other: SessionConfig) {
        if other.prefix.is_some() {
            self.prefix = other.prefix;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
        if other.max_entries.is_some() {
            self.max_entries = other.max_entries;
        }
        if other.encryption_key.is_some() {
            self.encryption_key = other.encryption_key;
        }
    }
}
