//! Session diagnostics endpoint
//!
//! An operational escape hatch: with `SESSION_DEBUG` enabled it returns the
//! raw per-guard auth state of the caller's session. Unflagged deployments
//! answer with a disabled message and expose nothing.

use crate::server::AppState;
use crate::session::Session;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Extension, Json,
};

pub async fn session_debug(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Response {
    if !state.config.session.debug {
        return "Debug mode is disabled".into_response();
    }

    let auth = session.get(|data| data.auth.clone());
    Json(auth).into_response()
}
