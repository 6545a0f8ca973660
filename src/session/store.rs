//! Pluggable session persistence
//!
//! The store is keyed by session id and treats the session blob as opaque:
//! last write wins. Concurrent requests on the same session may race; the
//! scaffold accepts that weakness rather than imposing cross-request
//! transactions on every backend.

use crate::error::Result;
use crate::session::SessionData;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Key/value persistence for session state
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, id: Uuid) -> Result<Option<SessionData>>;
    async fn save(&self, id: Uuid, data: &SessionData) -> Result<()>;
    async fn destroy(&self, id: Uuid) -> Result<()>;
}

/// In-memory session store with server-side expiry
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<Uuid, (SessionData, DateTime<Utc>)>>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::seconds(ttl_secs),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<SessionData>> {
        let expired = {
            let sessions = self.sessions.read().await;
            match sessions.get(&id) {
                Some((data, touched_at)) => {
                    if Utc::now() - *touched_at > self.ttl {
                        true
                    } else {
                        return Ok(Some(data.clone()));
                    }
                }
                None => return Ok(None),
            }
        };

        if expired {
            self.sessions.write().await.remove(&id);
        }
        Ok(None)
    }

    async fn save(&self, id: Uuid, data: &SessionData) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(id, (data.clone(), Utc::now()));
        Ok(())
    }

    async fn destroy(&self, id: Uuid) -> Result<()> {
        self.sessions.write().await.remove(&id);
        Ok(())
    }
}
