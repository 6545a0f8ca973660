//! Logout handler

use crate::error::Result;
use crate::routing::RouteContext;
use crate::server::AppState;
use crate::session::Session;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Extension,
};

/// Clear the guard's slot and send the visitor to the login page.
/// Safe to hit twice; logging out an anonymous session is a no-op.
pub async fn get_logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Extension(context): Extension<RouteContext>,
) -> Result<Response> {
    let guard = state.auth(&session).guard(&context.domain)?;
    guard.logout();
    Ok(Redirect::to(guard.redirect_fail()).into_response())
}
