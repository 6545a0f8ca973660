//! Persisted session state
//!
//! Layout mirrors what handlers expect to find on every request: the
//! per-guard auth slots, the `global_variables` and `user` maps, and the
//! internal flash area.

use crate::auth::AuthSlot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// One flash value with its delivery state.
///
/// `fresh` entries were written during the current request and become
/// readable after the next rotation; stale entries are readable now and are
/// dropped by the rotation after that.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FlashEntry {
    value: Value,
    fresh: bool,
}

/// The session blob persisted by a `SessionStore`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub auth: HashMap<String, AuthSlot>,
    pub global_variables: Map<String, Value>,
    pub user: Map<String, Value>,
    #[serde(default)]
    flash: HashMap<String, FlashEntry>,
    pub created_at: DateTime<Utc>,
}

impl Default for SessionData {
    fn default() -> Self {
        Self {
            auth: HashMap::new(),
            global_variables: Map::new(),
            user: Map::new(),
            flash: HashMap::new(),
            created_at: Utc::now(),
        }
    }
}

impl SessionData {
    /// Self-healing slot initialization: create the initial slot for every
    /// named guard the session does not know yet. Existing slots are left
    /// untouched, so authentication state survives config reloads.
    pub fn ensure_slots<'a>(&mut self, guards: impl IntoIterator<Item = &'a String>) {
        for guard in guards {
            self.auth.entry(guard.clone()).or_default();
        }
    }

    pub fn slot(&self, guard: &str) -> Option<&AuthSlot> {
        self.auth.get(guard)
    }

    /// Mutable slot access, creating the slot lazily when absent.
    ///
    /// Lazy creation covers token-driver guards, which are skipped by
    /// `ensure_slots` but may still log in through the facade.
    pub fn slot_mut(&mut self, guard: &str) -> &mut AuthSlot {
        self.auth.entry(guard.to_string()).or_default()
    }

    /// Stage a flash value for the next request on this session.
    pub fn flash_write(&mut self, key: &str, value: Value) {
        self.flash
            .insert(key.to_string(), FlashEntry { value, fresh: true });
    }

    /// Read-and-clear a flash value staged by the previous request.
    /// Values written during the current request are not visible.
    pub fn flash_read(&mut self, key: &str) -> Option<Value> {
        match self.flash.get(key) {
            Some(entry) if !entry.fresh => self.flash.remove(key).map(|e| e.value),
            _ => None,
        }
    }

    /// Rotate the flash area at request start: values staged by the previous
    /// request become readable, and readable values nobody consumed are
    /// dropped (at-most-once delivery).
    pub fn rotate_flash(&mut self) {
        self.flash.retain(|_, entry| entry.fresh);
        for entry in self.flash.values_mut() {
            entry.fresh = false;
        }
    }
}
