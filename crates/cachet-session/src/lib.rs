//! Encrypted, cache-backed session store.
//!
//! This crate keeps per-visitor state for a web authentication layer:
//! - The client carries only an opaque [`SessionId`]
//! - Attributes live in the cache backend, encrypted with AES-GCM
//! - Backends are pluggable through [`CacheAdapter`]; [`MemoryCache`] ships in-process
//! - Session ids can be renewed, destroyed, and handed off between contexts
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cachet_session::{AesDataEncrypter, MemoryCache, MemoryContext, SessionStore, StoreConfig};
//!
//! let store = SessionStore::with_config(
//!     Arc::new(MemoryCache::new()),
//!     Arc::new(AesDataEncrypter::generate()),
//!     &StoreConfig::default().with_prefix("app:"),
//! );
//!
//! let mut ctx = MemoryContext::new();
//! store.set(&mut ctx, "name", serde_json::json!("alice")).await?;
//! ```

mod adapter;
mod attributes;
mod config;
mod context;
mod crypto;
mod error;
mod memory;
mod session;
mod store;
mod ttl;

pub use adapter::CacheAdapter;
pub use attributes::{USER_PROFILE, requested_url_key};
pub use config::{DEFAULT_TIMEOUT_SECS, StoreConfig};
pub use context::{MemoryContext, SESSION_ID_KEY, SessionContext};
pub use crypto::{AesDataEncrypter, DEFAULT_KEY_LEN, DataEncrypter, generate_key};
pub use error::{Error, Result};
pub use memory::{CacheStats, DEFAULT_MAX_ENTRIES, MemoryCache};
pub use session::{AttributeMap, SessionId, SessionStore, TrackableSession};
pub use store::EncryptedCacheStore;
pub use ttl::ExpiryTracker;
