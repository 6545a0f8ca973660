//! The auth facade
//!
//! The single operation surface callers use to authenticate: `attempt`,
//! `logout`, current-principal lookup and redirect targets, each scoped to
//! one guard. All session-auth mutation funnels through here into the slot
//! transitions; no other component writes auth state.

use crate::auth::registry::{Guard, GuardRegistry};
use crate::auth::storage::{verify_password, PrincipalStorage};
use crate::domain::{Credentials, Principal};
use crate::error::{AppError, Result};
use crate::session::Session;
use std::collections::HashMap;
use std::sync::Arc;

/// Principal storages keyed by provider name
#[derive(Clone, Default)]
pub struct ProviderSet {
    storages: HashMap<String, Arc<dyn PrincipalStorage>>,
}

impl ProviderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, provider: impl Into<String>, storage: Arc<dyn PrincipalStorage>) {
        self.storages.insert(provider.into(), storage);
    }

    pub fn get(&self, provider: &str) -> Option<Arc<dyn PrincipalStorage>> {
        self.storages.get(provider).cloned()
    }

    pub fn contains(&self, provider: &str) -> bool {
        self.storages.contains_key(provider)
    }
}

/// Entry point bound to one request's session
#[derive(Clone)]
pub struct Auth {
    session: Session,
    registry: Arc<GuardRegistry>,
    providers: Arc<ProviderSet>,
}

impl Auth {
    pub fn new(session: Session, registry: Arc<GuardRegistry>, providers: Arc<ProviderSet>) -> Self {
        Self {
            session,
            registry,
            providers,
        }
    }

    /// Scope the facade to one guard.
    ///
    /// An unknown guard name or a provider with no wired storage is a
    /// configuration error and is returned as such, never papered over.
    pub fn guard(&self, name: &str) -> Result<GuardAuth> {
        let guard = self.registry.get(name)?.clone();
        let storage = self.providers.get(&guard.provider).ok_or_else(|| {
            AppError::Config(format!(
                "no principal storage wired for provider `{}`",
                guard.provider
            ))
        })?;

        Ok(GuardAuth {
            session: self.session.clone(),
            guard,
            storage,
        })
    }
}

/// The facade scoped to a single guard
pub struct GuardAuth {
    session: Session,
    guard: Guard,
    storage: Arc<dyn PrincipalStorage>,
}

impl std::fmt::Debug for GuardAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardAuth")
            .field("guard", &self.guard)
            .finish_non_exhaustive()
    }
}

impl GuardAuth {
    /// Try to authenticate with the given credentials.
    ///
    /// Success transitions the guard's slot and returns true. Every failure
    /// mode (unknown principal, wrong password, storage error) returns false
    /// with no side effects; the caller learns nothing beyond the boolean.
    /// Storage errors additionally log at warn so operators can tell an
    /// outage from a flood of bad passwords.
    pub async fn attempt(&self, credentials: &Credentials) -> bool {
        let principal = match self.storage.find_by_username(&credentials.username).await {
            Ok(Some(principal)) => principal,
            Ok(None) => {
                tracing::debug!(guard = %self.guard.name, "attempt for unknown principal");
                return false;
            }
            Err(e) => {
                tracing::warn!(
                    guard = %self.guard.name,
                    error = %e,
                    "principal lookup failed; treating as authentication failure"
                );
                return false;
            }
        };

        if !verify_password(&principal.password_hash, &credentials.password) {
            tracing::debug!(guard = %self.guard.name, "credential verification failed");
            return false;
        }

        self.session
            .update(|data| data.slot_mut(&self.guard.name).login(principal.id));
        true
    }

    /// Clear the guard's slot. Logging out an already-unauthenticated guard
    /// is a no-op.
    pub fn logout(&self) {
        self.session
            .update(|data| data.slot_mut(&self.guard.name).logout());
    }

    /// The stored principal for the current authenticated state.
    ///
    /// Anonymous traffic performs no storage lookup.
    pub async fn user(&self) -> Option<Principal> {
        let id = self.session.get(|data| {
            data.slot(&self.guard.name)
                .filter(|slot| slot.is_authenticated)
                .and_then(|slot| slot.id)
        })?;

        match self.storage.find_by_id(id).await {
            Ok(principal) => principal,
            Err(e) => {
                tracing::warn!(
                    guard = %self.guard.name,
                    error = %e,
                    "principal lookup by id failed"
                );
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.get(|data| {
            data.slot(&self.guard.name)
                .map(|slot| slot.is_authenticated)
                .unwrap_or(false)
        })
    }

    pub fn redirect_auth(&self) -> &str {
        &self.guard.redirect_auth
    }

    pub fn redirect_fail(&self) -> &str {
        &self.guard.redirect_fail
    }
}
