//! Guard registry built once at boot
//!
//! The registry denormalizes the guard/provider tables into one validated
//! lookup structure. Every invariant the routing and auth layers rely on is
//! checked here, eagerly, so a misconfigured deployment refuses to start
//! instead of failing on some later request.

use crate::config::{AuthConfig, GuardDriver};
use crate::error::{AppError, Result};
use std::collections::HashMap;

/// A fully resolved guard: its own settings joined with its provider's
#[derive(Debug, Clone)]
pub struct Guard {
    pub name: String,
    pub driver: GuardDriver,
    pub provider: String,
    /// Logical principal resource name, e.g. "Admin"
    pub entity: String,
    /// URL segment owning this domain
    pub prefix: String,
    pub redirect_auth: String,
    pub redirect_fail: String,
}

/// Validated, immutable guard table
#[derive(Debug)]
pub struct GuardRegistry {
    guards: HashMap<String, Guard>,
    default_guard: String,
    session_guards: Vec<String>,
}

impl GuardRegistry {
    /// Join and validate the configured guard/provider tables.
    ///
    /// Fatal (startup refuses): unknown default guard, a guard referencing a
    /// provider that is not configured, or a provider with an empty prefix.
    pub fn from_config(auth: &AuthConfig) -> Result<Self> {
        if auth.guards.is_empty() {
            return Err(AppError::Config("no guards configured".to_string()));
        }
        if !auth.guards.contains_key(&auth.default_guard) {
            return Err(AppError::Config(format!(
                "default guard `{}` is not a configured guard",
                auth.default_guard
            )));
        }

        let mut guards = HashMap::new();
        for (name, guard) in &auth.guards {
            let provider = auth.providers.get(&guard.provider).ok_or_else(|| {
                AppError::Config(format!(
                    "guard `{}` references provider `{}` which is not configured",
                    name, guard.provider
                ))
            })?;
            if provider.prefix.trim().is_empty() {
                return Err(AppError::Config(format!(
                    "please add a prefix to provider `{}` (required by guard `{}`)",
                    guard.provider, name
                )));
            }

            guards.insert(
                name.clone(),
                Guard {
                    name: name.clone(),
                    driver: guard.driver,
                    provider: guard.provider.clone(),
                    entity: provider.entity.clone(),
                    prefix: provider.prefix.clone(),
                    redirect_auth: guard.redirect_auth.clone(),
                    redirect_fail: guard.redirect_fail.clone(),
                },
            );
        }

        let mut session_guards: Vec<String> = guards
            .values()
            .filter(|g| g.driver == GuardDriver::Session)
            .map(|g| g.name.clone())
            .collect();
        session_guards.sort();

        Ok(Self {
            guards,
            default_guard: auth.default_guard.clone(),
            session_guards,
        })
    }

    /// Look up a guard by (lowercased) name. Unknown names are programmer or
    /// configuration errors, surfaced immediately.
    pub fn get(&self, name: &str) -> Result<&Guard> {
        self.guards
            .get(&name.to_lowercase())
            .ok_or_else(|| AppError::UnknownGuard(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.guards.contains_key(name)
    }

    pub fn default_guard(&self) -> &str {
        &self.default_guard
    }

    /// Names of guards whose state lives in the session, in stable order
    pub fn session_guards(&self) -> &[String] {
        &self.session_guards
    }

    pub fn iter(&self) -> impl Iterator<Item = &Guard> {
        self.guards.values()
    }
}
