//! Request/response context the session store reads and writes.
//!
//! The HTTP layer supplies an implementation of [`SessionContext`] per
//! request. The store only ever touches the [`SESSION_ID_KEY`] slot, in two
//! places: the client-carried session (e.g. a signed cookie) and an
//! ephemeral per-request attribute.

use std::collections::HashMap;

/// Name of the slot holding the session id.
pub const SESSION_ID_KEY: &str = "cachetSessionId";

/// Per-request view of the client-carried session and request attributes.
pub trait SessionContext {
    /// Read a value from the client-carried session.
    fn client_session_value(&self, key: &str) -> Option<String>;

    /// Write (`Some`) or remove (`None`) a value in the client-carried session.
    fn set_client_session_value(&mut self, key: &str, value: Option<String>);

    /// Drop every value from the client-carried session.
    fn clear_client_session(&mut self);

    /// Read a per-request attribute.
    fn request_attribute(&self, key: &str) -> Option<String>;

    /// Write (`Some`) or remove (`None`) a per-request attribute.
    fn set_request_attribute(&mut self, key: &str, value: Option<String>);
}

/// Map-backed [`SessionContext`].
///
/// Useful in tests and anywhere a request is simulated outside an HTTP stack.
#[derive(Debug, Clone, Default)]
pub struct MemoryContext {
    session: HashMap<String, String>,
    attributes: HashMap<String, String>,
}

impl MemoryContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the client-carried session, e.g. to build the next request.
    pub fn client_session(&self) -> &HashMap<String, String> {
        &self.session
    }

    /// Start a new request carrying this context's client session but no
    /// request attributes, as a browser would on its next round trip.
    pub fn next_request(&self) -> Self {
        Self {
            session: self.session.clone(),
            attributes: HashMap::new(),
        }
    }
}

impl SessionContext for MemoryContext {
    fn client_session_value(&self, key: &str) -> Option<String> {
        self.session.get(key).cloned()
    }

    fn set_client_session_value(&mut self, key: &str, value: Option<String>) {
        match value {
            Some(v) => {
                self.session.insert(key.to_string(), v);
            }
            None => {
                self.session.remove(key);
            }
        }
    }

    fn clear_client_session(&mut self) {
        self.session.clear();
    }

    fn request_attribute(&self, key: &str) -> Option<String> {
        self.attributes.get(key).cloned()
    }

    fn set_request_attribute(&mut self, key: &str, value: Option<String>) {
        match value {
            Some(v) => {
                self.attributes.insert(key.to_string(), v);
            }
            None => {
                self.attributes.remove(key);
            }
        }
    }
}
