//! Session state, its persistence boundary, and the request-scoped handle
//!
//! A `Session` handle is created by the session middleware, inserted into
//! request extensions, and persisted back to the store after the handler
//! runs. Handlers and the auth facade share the same handle, so every
//! mutation in one request is visible to the rest of that request's
//! pipeline.

pub mod data;
pub mod store;

pub use data::SessionData;
pub use store::{MemorySessionStore, SessionStore};

#[cfg(test)]
pub use store::MockSessionStore;

use serde_json::Value;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Request-scoped handle to one session's state
#[derive(Clone)]
pub struct Session {
    id: Uuid,
    is_new: bool,
    inner: Arc<Mutex<SessionData>>,
}

impl Session {
    /// Fresh session with a new id and initial state
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            is_new: true,
            inner: Arc::new(Mutex::new(SessionData::default())),
        }
    }

    /// Handle over state loaded from the store
    pub fn from_data(id: Uuid, data: SessionData) -> Self {
        Self {
            id,
            is_new: false,
            inner: Arc::new(Mutex::new(data)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Whether this session was created during the current request
    /// (and therefore needs a Set-Cookie on the response)
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Read access to the session state
    pub fn get<R>(&self, f: impl FnOnce(&SessionData) -> R) -> R {
        let data = self.inner.lock().expect("session lock poisoned");
        f(&data)
    }

    /// Write access to the session state
    pub fn update<R>(&self, f: impl FnOnce(&mut SessionData) -> R) -> R {
        let mut data = self.inner.lock().expect("session lock poisoned");
        f(&mut data)
    }

    /// Copy of the current state, for persistence
    pub fn snapshot(&self) -> SessionData {
        self.get(|data| data.clone())
    }

    pub fn flash_write(&self, key: &str, value: Value) {
        self.update(|data| data.flash_write(key, value));
    }

    pub fn flash_read(&self, key: &str) -> Option<Value> {
        self.update(|data| data.flash_read(key))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
