//! Login handlers
//!
//! One pair of handlers serves every guard: the route-context domain picks
//! the guard, the guard's configuration picks the redirect targets, and the
//! view interceptor picks the template. User-facing messaging rides the
//! flash channel only.

use crate::domain::Credentials;
use crate::error::Result;
use crate::routing::RouteContext;
use crate::server::AppState;
use crate::session::Session;
use crate::view::Renderer;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde_json::{json, Map, Value};
use validator::Validate;

pub async fn get_login(
    Extension(session): Extension<Session>,
    Extension(renderer): Extension<Renderer>,
) -> Response {
    let mut locals = Map::new();
    locals.insert("title".to_string(), json!("Login"));
    for key in ["error", "old", "success"] {
        if let Some(value) = session.flash_read(key) {
            locals.insert(key.to_string(), value);
        }
    }
    renderer.render("index", locals)
}

pub async fn post_login(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Extension(context): Extension<RouteContext>,
    Form(form): Form<Credentials>,
) -> Result<Response> {
    let auth = state.auth(&session);
    let guard = auth.guard(&context.domain)?;

    if let Err(errors) = form.validate() {
        session.flash_write("error", Value::String(validation_messages(&errors)));
        session.flash_write("old", json!({ "username": form.username }));
        return Ok(Redirect::to(guard.redirect_fail()).into_response());
    }

    if guard.attempt(&form).await {
        return Ok(Redirect::to(guard.redirect_auth()).into_response());
    }

    session.flash_write(
        "error",
        Value::String("These credentials do not match our records.".to_string()),
    );
    session.flash_write("old", json!({ "username": form.username }));
    Ok(Redirect::to(guard.redirect_fail()).into_response())
}

fn validation_messages(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .values()
        .flat_map(|field_errors| field_errors.iter())
        .map(|error| {
            error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| "invalid value".to_string())
        })
        .collect();
    messages.sort();
    messages.join(" ")
}
