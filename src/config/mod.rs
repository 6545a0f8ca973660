//! Configuration management for Warden Core
//!
//! The configuration is an explicitly constructed, immutable object handed to
//! component constructors at startup. There is no ambient registry; tests
//! build their own `Config` by hand and inject it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server host
    pub http_host: String,
    /// HTTP server port
    pub http_port: u16,
    /// Session configuration
    pub session: SessionConfig,
    /// Guard and provider tables
    pub auth: AuthConfig,
    /// Controller directory used when the request path has no controller
    /// segment (e.g. the root of a domain)
    pub default_controller: String,
    /// Root directory scanned for templates at startup
    pub view_root: PathBuf,
}

/// Session cookie and lifetime settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Name of the session id cookie
    pub cookie_name: String,
    /// Server-side session lifetime in seconds
    pub ttl_secs: i64,
    /// When enabled, `/debug` returns the raw session auth state.
    /// Off by default; never enable outside diagnostics.
    pub debug: bool,
}

/// The guard/provider tree
///
/// Serializable so an entire deployment's auth topology can be supplied as
/// JSON through the `AUTH_CONFIG` environment variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Guard used when the first path segment names no other guard
    pub default_guard: String,
    /// Named authentication domains
    pub guards: HashMap<String, GuardConfig>,
    /// Principal storage bindings shared by guards
    pub providers: HashMap<String, ProviderConfig>,
}

/// One named authentication domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Provider this guard authenticates against
    pub provider: String,
    /// Where the guard keeps its authentication state
    pub driver: GuardDriver,
    /// Redirect target after a successful attempt
    pub redirect_auth: String,
    /// Redirect target after a failed attempt (and for logged-out access)
    pub redirect_fail: String,
}

/// Where a guard keeps its per-principal authentication state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuardDriver {
    /// State lives in the server-side session
    Session,
    /// State is carried by a bearer token; no session slot is created
    Token,
}

/// Principal storage binding behind one or more guards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Logical name of the principal resource, e.g. "Admin"
    pub entity: String,
    /// URL path segment owning this domain; must be non-empty
    pub prefix: String,
}

impl AuthConfig {
    /// The stock three-domain topology: admin and developer behind their own
    /// prefixes, user as the default guard mounted at the root.
    pub fn default_tree() -> Self {
        let mut guards = HashMap::new();
        guards.insert(
            "admin".to_string(),
            GuardConfig {
                provider: "admins".to_string(),
                driver: GuardDriver::Session,
                redirect_auth: "/admin/dashboard".to_string(),
                redirect_fail: "/admin/login".to_string(),
            },
        );
        guards.insert(
            "user".to_string(),
            GuardConfig {
                provider: "users".to_string(),
                driver: GuardDriver::Session,
                redirect_auth: "/dashboard".to_string(),
                redirect_fail: "/login".to_string(),
            },
        );
        guards.insert(
            "developer".to_string(),
            GuardConfig {
                provider: "developers".to_string(),
                driver: GuardDriver::Session,
                redirect_auth: "/developer/dashboard".to_string(),
                redirect_fail: "/developer/login".to_string(),
            },
        );

        let mut providers = HashMap::new();
        providers.insert(
            "admins".to_string(),
            ProviderConfig {
                entity: "Admin".to_string(),
                prefix: "admin".to_string(),
            },
        );
        providers.insert(
            "users".to_string(),
            ProviderConfig {
                entity: "User".to_string(),
                prefix: "user".to_string(),
            },
        );
        providers.insert(
            "developers".to_string(),
            ProviderConfig {
                entity: "Developer".to_string(),
                prefix: "developer".to_string(),
            },
        );

        Self {
            default_guard: "user".to_string(),
            guards,
            providers,
        }
    }

    /// Lowercase every guard name, provider name and cross-reference.
    ///
    /// Guard lookup is normalized once here so that every later comparison is
    /// a plain case-sensitive match against an already-lowercased table.
    pub fn normalize(&mut self) {
        self.default_guard = self.default_guard.to_lowercase();

        let guards = std::mem::take(&mut self.guards);
        self.guards = guards
            .into_iter()
            .map(|(name, mut guard)| {
                guard.provider = guard.provider.to_lowercase();
                (name.to_lowercase(), guard)
            })
            .collect();

        let providers = std::mem::take(&mut self.providers);
        self.providers = providers
            .into_iter()
            .map(|(name, provider)| (name.to_lowercase(), provider))
            .collect();
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// `AUTH_CONFIG` may carry the whole guard/provider tree as JSON; without
    /// it the stock three-domain topology is used.
    pub fn from_env() -> Result<Self> {
        let auth = match env::var("AUTH_CONFIG") {
            Ok(raw) => serde_json::from_str(&raw).context("Invalid AUTH_CONFIG JSON")?,
            Err(_) => AuthConfig::default_tree(),
        };

        let mut config = Self {
            http_host: env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("Invalid HTTP_PORT")?,
            session: SessionConfig {
                cookie_name: env::var("SESSION_COOKIE")
                    .unwrap_or_else(|_| "warden.sid".to_string()),
                ttl_secs: env::var("SESSION_TTL_SECS")
                    .unwrap_or_else(|_| "86400".to_string())
                    .parse()
                    .unwrap_or(86400),
                debug: env::var("SESSION_DEBUG")
                    .map(|s| s.to_lowercase() == "true")
                    .unwrap_or(false),
            },
            auth,
            default_controller: env::var("DEFAULT_CONTROLLER")
                .unwrap_or_else(|_| "home".to_string()),
            view_root: env::var("VIEW_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("view")),
        };
        config.auth.normalize();

        Ok(config)
    }

    /// Get HTTP server address
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}
