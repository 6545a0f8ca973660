//! Domain page handlers
//!
//! These render through the view interceptor; the short view name "index"
//! plus the route context selects the concrete template.

use crate::error::Result;
use crate::server::AppState;
use crate::session::Session;
use crate::view::Renderer;
use axum::{extract::State, response::Response, Extension};
use serde_json::{json, Map};

/// Root of a domain
pub async fn home(
    Extension(session): Extension<Session>,
    Extension(renderer): Extension<Renderer>,
) -> Response {
    let mut locals = Map::new();
    locals.insert("title".to_string(), json!("Home"));
    if let Some(success) = session.flash_read("success") {
        locals.insert("success".to_string(), success);
    }
    renderer.render("index", locals)
}

/// Authenticated landing page; `require_auth` gates it upstream
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Extension(renderer): Extension<Renderer>,
) -> Result<Response> {
    let guard = state.auth(&session).guard(&renderer.route().domain)?;

    let mut locals = Map::new();
    locals.insert("title".to_string(), json!("Dashboard"));
    if let Some(user) = guard.user().await {
        locals.insert("username".to_string(), json!(user.username));
    }
    Ok(renderer.render("index", locals))
}
