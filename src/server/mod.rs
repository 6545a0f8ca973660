//! Server initialization and routing
//!
//! The route table is static: it is built once at startup by iterating the
//! validated guard registry, so a guard that cannot be mounted fails the
//! boot instead of silently disappearing at request time.

use crate::auth::{
    Auth, GuardRegistry, MemoryPrincipalStorage, PrincipalStorage, ProviderSet,
};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::handlers;
use crate::middleware::{
    auth_slots_middleware, render_middleware, require_auth_middleware, require_guest_middleware,
    route_context_middleware, session_middleware,
};
use crate::session::{MemorySessionStore, Session, SessionStore};
use crate::view::{ManifestTemplateResolver, TemplateResolver};
use axum::{
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<GuardRegistry>,
    pub sessions: Arc<dyn SessionStore>,
    pub providers: Arc<ProviderSet>,
    pub templates: Arc<dyn TemplateResolver>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Assemble state from explicit collaborators.
    ///
    /// Validates the guard registry and checks that every guard's provider
    /// has a wired principal storage; both are fatal here, at boot.
    pub fn new(
        config: Config,
        sessions: Arc<dyn SessionStore>,
        providers: ProviderSet,
        templates: Arc<dyn TemplateResolver>,
    ) -> Result<Self> {
        let registry = Arc::new(GuardRegistry::from_config(&config.auth)?);
        for guard in registry.iter() {
            if !providers.contains(&guard.provider) {
                return Err(AppError::Config(format!(
                    "no principal storage wired for provider `{}` (guard `{}`)",
                    guard.provider, guard.name
                )));
            }
        }

        Ok(Self {
            config: Arc::new(config),
            registry,
            sessions,
            providers: Arc::new(providers),
            templates,
        })
    }

    /// Default wiring: in-memory session store, one in-memory principal
    /// storage per configured provider, and a template manifest scanned from
    /// the view root.
    pub fn from_config(config: Config) -> Result<Self> {
        let sessions: Arc<dyn SessionStore> =
            Arc::new(MemorySessionStore::new(config.session.ttl_secs));

        let mut providers = ProviderSet::new();
        for name in config.auth.providers.keys() {
            providers.insert(
                name.clone(),
                Arc::new(MemoryPrincipalStorage::new()) as Arc<dyn PrincipalStorage>,
            );
        }

        let templates: Arc<dyn TemplateResolver> = if config.view_root.is_dir() {
            let manifest = ManifestTemplateResolver::from_dir(&config.view_root)
                .map_err(|e| AppError::Config(format!("view manifest: {e:#}")))?;
            info!(
                templates = manifest.len(),
                root = %config.view_root.display(),
                "template manifest built"
            );
            Arc::new(manifest)
        } else {
            tracing::warn!(
                root = %config.view_root.display(),
                "view root missing; starting with an empty template manifest"
            );
            Arc::new(ManifestTemplateResolver::new())
        };

        Self::new(config, sessions, providers, templates)
    }

    /// Auth facade bound to one request's session
    pub fn auth(&self, session: &Session) -> Auth {
        Auth::new(
            session.clone(),
            self.registry.clone(),
            self.providers.clone(),
        )
    }
}

/// One domain's routes: home, dashboard and the login/logout pair,
/// gated by the auth middleware appropriate to each group.
fn domain_router(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/dashboard", get(handlers::pages::dashboard))
        .route("/logout", get(handlers::logout::get_logout))
        .route_layer(from_fn_with_state(state.clone(), require_auth_middleware));

    let guest = Router::new()
        .route(
            "/login",
            get(handlers::login::get_login).post(handlers::login::post_login),
        )
        .route_layer(from_fn_with_state(state.clone(), require_guest_middleware));

    Router::new()
        .route("/", get(handlers::pages::home))
        .merge(protected)
        .merge(guest)
}

/// Build the application router from the validated registry
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/debug", get(handlers::debug::session_debug));

    for guard in state.registry.iter() {
        let routes = domain_router(&state);
        if guard.name == state.registry.default_guard() {
            router = router.merge(routes);
        } else {
            router = router.nest(&format!("/{}", guard.prefix), routes);
        }
    }

    router
        .fallback(handlers::fallback::not_found)
        .layer(from_fn_with_state(state.clone(), render_middleware))
        .layer(from_fn_with_state(state.clone(), route_context_middleware))
        .layer(from_fn_with_state(state.clone(), auth_slots_middleware))
        .layer(from_fn_with_state(state.clone(), session_middleware))
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server until shutdown
pub async fn run(config: Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    let addr = state.config.http_addr();

    let listener = TcpListener::bind(&addr).await?;
    info!("listening on {}", addr);

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
