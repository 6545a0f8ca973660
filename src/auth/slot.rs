//! Per-guard authentication state
//!
//! One slot per guard per session. The slot is the authoritative record of
//! "who is logged in under this guard"; it is only ever written through the
//! transitions below, and only the auth facade requests them.

use serde::{Deserialize, Serialize};

/// Session-scoped authentication state for one guard.
///
/// States: unauthenticated (`is_authenticated == false`, `id == None`) and
/// authenticated (`true`, `Some(id)`). A slot is cleared on logout, never
/// removed from the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSlot {
    #[serde(rename = "isAuthenticated")]
    pub is_authenticated: bool,
    pub id: Option<i64>,
}

impl Default for AuthSlot {
    fn default() -> Self {
        Self {
            is_authenticated: false,
            id: None,
        }
    }
}

impl AuthSlot {
    /// Transition to authenticated. Only called after a successful attempt.
    pub fn login(&mut self, id: i64) {
        self.is_authenticated = true;
        self.id = Some(id);
    }

    /// Transition back to unauthenticated. Idempotent.
    pub fn logout(&mut self) {
        self.is_authenticated = false;
        self.id = None;
    }
}
