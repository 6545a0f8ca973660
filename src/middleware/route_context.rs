//! Route context and render stages
//!
//! The route context is computed once, at the start of the pipeline, and is
//! immutable afterward. The render stage then binds a per-request `Renderer`
//! over that context, so handlers call an explicit decorator instead of
//! mutating any shared render machinery.

use crate::routing::{self, RouteContext};
use crate::server::AppState;
use crate::view::Renderer;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

pub async fn route_context_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let context = routing::resolve(&path, &state.registry);
    request.extensions_mut().insert(context);

    // One canonical URL per default-domain page: the default guard's pages
    // live at the root, so a path spelling the guard name out is redirected
    // to the same path without it.
    if let Some(canonical) = strip_default_prefix(&path, state.registry.default_guard()) {
        return Redirect::temporary(&canonical).into_response();
    }

    next.run(request).await
}

fn strip_default_prefix(path: &str, default_guard: &str) -> Option<String> {
    let rest = path.strip_prefix('/')?;
    let (first, tail) = match rest.split_once('/') {
        Some((first, tail)) => (first, Some(tail)),
        None => (rest, None),
    };
    if first.to_lowercase() != default_guard {
        return None;
    }
    Some(match tail {
        Some(tail) if !tail.is_empty() => format!("/{tail}"),
        _ => "/".to_string(),
    })
}

pub async fn render_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let route = request
        .extensions()
        .get::<RouteContext>()
        .cloned()
        .unwrap_or_else(|| RouteContext {
            domain: state.registry.default_guard().to_string(),
            controller: None,
        });

    let renderer = Renderer::new(
        state.templates.clone(),
        route,
        state.config.default_controller.clone(),
    );
    request.extensions_mut().insert(renderer);

    next.run(request).await
}
