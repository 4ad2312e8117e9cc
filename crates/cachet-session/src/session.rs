//! Session identifier lifecycle and per-session attribute storage.
//!
//! The browser carries only an opaque [`SessionId`]; everything else lives in
//! an [`AttributeMap`] stored, encrypted, under `prefix + session_id` in the
//! cache backend.
//!
//! # Session creation
//!
//! Every operation that reads or writes attributes first resolves the
//! session id through [`SessionStore::get_or_create_session_id`], which
//! issues a new id when the context carries none. Reading an attribute on a
//! fresh context therefore creates a session. Operations that must not
//! create one ([`destroy_session`](SessionStore::destroy_session),
//! [`trackable_session`](SessionStore::trackable_session)) only look up.
//!
//! # Concurrency
//!
//! [`SessionStore::set`] loads the whole map, changes one entry and writes
//! the whole map back. There is no locking or versioning across that pair,
//! so two concurrent `set` calls on the same session can race and the later
//! write drops the earlier one's attribute. Renewal racing with a write
//! under the old id can likewise lose that write. The backend is trusted for
//! atomicity of single get/set calls only.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::adapter::CacheAdapter;
use crate::config::StoreConfig;
use crate::context::{SESSION_ID_KEY, SessionContext};
use crate::crypto::DataEncrypter;
use crate::error::Result;
use crate::store::EncryptedCacheStore;

/// Named attributes held for one session.
pub type AttributeMap = HashMap<String, serde_json::Value>;

/// Opaque session identifier carried by the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a new random session id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the id, returning the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Portable handle used to re-bind a session onto another context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackableSession {
    session_id: SessionId,
}

impl TrackableSession {
    /// Wrap a session id.
    pub fn new(session_id: SessionId) -> Self {
        Self { session_id }
    }

    /// The wrapped session id.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}

/// Encrypted, cache-backed session store.
///
/// Cheap to share behind an `Arc`; holds no per-request state. Each call
/// works on its own copy of the attribute map.
pub struct SessionStore {
    store: EncryptedCacheStore<String, AttributeMap>,
    prefix: Option<String>,
}

impl SessionStore {
    /// Create a store with no key prefix and the default one hour TTL.
    pub fn new(cache: Arc<dyn CacheAdapter>, encrypter: Arc<dyn DataEncrypter>) -> Self {
        Self::with_config(cache, encrypter, &StoreConfig::default())
    }

    /// Create a store from a [`StoreConfig`].
    pub fn with_config(
        cache: Arc<dyn CacheAdapter>,
        encrypter: Arc<dyn DataEncrypter>,
        config: &StoreConfig,
    ) -> Self {
        Self {
            store: EncryptedCacheStore::new(cache, encrypter).with_timeout(config.timeout_secs),
            prefix: config.prefix.clone(),
        }
    }

    /// The cache key prefix, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Change the cache key prefix. Records already written under the old
    /// prefix are not migrated.
    pub fn set_prefix(&mut self, prefix: Option<String>) {
        self.prefix = prefix;
    }

    /// TTL in seconds applied to session writes.
    pub fn timeout(&self) -> u64 {
        self.store.timeout()
    }

    /// Change the TTL applied to subsequent session writes.
    pub fn set_timeout(&mut self, secs: u64) {
        self.store.set_timeout(secs);
    }

    /// The underlying encrypted store.
    pub fn store(&self) -> &EncryptedCacheStore<String, AttributeMap> {
        &self.store
    }

    /// Cache key under which the attribute map for `session_id` is stored.
    pub fn cache_key(&self, session_id: &SessionId) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}{session_id}"),
            None => session_id.to_string(),
        }
    }

    /// Resolve the session id for `ctx`, issuing a new one if it has none.
    ///
    /// The client-carried session is checked first, then the request
    /// attribute. An id found only in the request attribute is copied into
    /// the client-carried session. A new id is written to both.
    pub fn get_or_create_session_id<C>(&self, ctx: &mut C) -> SessionId
    where
        C: SessionContext + ?Sized,
    {
        if let Some(session_id) = self.lookup_session_id(ctx) {
            return session_id;
        }

        let session_id = SessionId::generate();
        debug!(session_id = %session_id, "Generated session id");
        ctx.set_client_session_value(SESSION_ID_KEY, Some(session_id.to_string()));
        ctx.set_request_attribute(SESSION_ID_KEY, Some(session_id.to_string()));
        session_id
    }

    /// Look up the session id without creating one.
    fn lookup_session_id<C>(&self, ctx: &mut C) -> Option<SessionId>
    where
        C: SessionContext + ?Sized,
    {
        if let Some(id) = ctx.client_session_value(SESSION_ID_KEY) {
            trace!(session_id = %id, "Session id from client session");
            return Some(SessionId(id));
        }

        let id = ctx.request_attribute(SESSION_ID_KEY)?;
        trace!(session_id = %id, "Session id from request, re-saving in client session");
        ctx.set_client_session_value(SESSION_ID_KEY, Some(id.clone()));
        Some(SessionId(id))
    }

    /// Read one attribute, creating the session if needed.
    ///
    /// A missing map or a missing attribute is `Ok(None)`; a backend failure
    /// is [`Error::StoreUnavailable`](crate::Error::StoreUnavailable).
    pub async fn get<C>(&self, ctx: &mut C, name: &str) -> Result<Option<serde_json::Value>>
    where
        C: SessionContext + ?Sized,
    {
        let session_id = self.get_or_create_session_id(ctx);
        let value = self
            .store
            .get(&self.cache_key(&session_id))
            .await?
            .and_then(|mut values| values.remove(name));

        trace!(session_id = %session_id, key = %name, found = value.is_some(), "Session get");
        Ok(value)
    }

    /// Write one attribute, creating the session if needed.
    ///
    /// Loads the whole map, assigns `name`, and writes the map back.
    pub async fn set<C>(&self, ctx: &mut C, name: &str, value: serde_json::Value) -> Result<()>
    where
        C: SessionContext + ?Sized,
    {
        let session_id = self.get_or_create_session_id(ctx);
        let key = self.cache_key(&session_id);

        let mut values = self.store.get(&key).await?.unwrap_or_default();
        trace!(session_id = %session_id, key = %name, "Session set");
        values.insert(name.to_string(), value);
        self.store.set(&key, &values).await
    }

    /// Forget the session on the client side.
    ///
    /// Returns `false` if the context carries no session. The attribute map
    /// is left in the backend to expire by TTL.
    pub fn destroy_session<C>(&self, ctx: &mut C) -> bool
    where
        C: SessionContext + ?Sized,
    {
        match self.lookup_session_id(ctx) {
            Some(session_id) => {
                debug!(session_id = %session_id, "Destroying session");
                ctx.clear_client_session();
                ctx.set_request_attribute(SESSION_ID_KEY, None);
                true
            }
            None => false,
        }
    }

    /// Current session as a portable handle, without creating one.
    pub fn trackable_session<C>(&self, ctx: &mut C) -> Option<TrackableSession>
    where
        C: SessionContext + ?Sized,
    {
        self.lookup_session_id(ctx).map(TrackableSession::new)
    }

    /// Bind the session named by `handle` onto `ctx`.
    pub fn build_from_trackable_session<C>(&self, ctx: &mut C, handle: &TrackableSession) -> &Self
    where
        C: SessionContext + ?Sized,
    {
        let id = handle.session_id().to_string();
        ctx.set_client_session_value(SESSION_ID_KEY, Some(id.clone()));
        ctx.set_request_attribute(SESSION_ID_KEY, Some(id));
        self
    }

    /// Replace the session id, carrying the attributes over.
    ///
    /// The attributes are copied under the new id; the old record stays in
    /// the backend until its TTL runs out.
    pub async fn renew_session<C>(&self, ctx: &mut C) -> Result<bool>
    where
        C: SessionContext + ?Sized,
    {
        let old_id = self.get_or_create_session_id(ctx);
        let old_data = self.store.get(&self.cache_key(&old_id)).await?;

        ctx.set_client_session_value(SESSION_ID_KEY, None);
        ctx.set_request_attribute(SESSION_ID_KEY, None);

        let new_id = self.get_or_create_session_id(ctx);
        if let Some(data) = old_data {
            self.store.set(&self.cache_key(&new_id), &data).await?;
        }

        debug!(old = %old_id, new = %new_id, "Renewed session");
        Ok(true)
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("store", &self.store)
            .field("prefix", &self.prefix)
            .field("timeout", &self.timeout())
            .finish()
    }
}
