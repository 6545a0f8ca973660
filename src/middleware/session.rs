//! Session middleware
//!
//! Loads (or creates) the session for the incoming request, rotates the
//! flash area, exposes a `Session` handle through request extensions, and
//! persists the state back to the store once the handler has run. The store
//! sees one blob per session, last write wins.

use crate::server::AppState;
use crate::session::Session;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    let cookie_name = state.config.session.cookie_name.clone();

    let mut session = None;
    if let Some(cookie) = jar.get(&cookie_name) {
        if let Ok(id) = Uuid::parse_str(cookie.value()) {
            match state.sessions.load(id).await {
                Ok(Some(mut data)) => {
                    data.rotate_flash();
                    session = Some(Session::from_data(id, data));
                }
                Ok(None) => {}
                Err(e) => {
                    // Fail closed into a fresh anonymous session.
                    tracing::error!(error = %e, "session load failed; starting a fresh session");
                }
            }
        }
    }
    let session = session.unwrap_or_else(Session::new);

    request.extensions_mut().insert(session.clone());
    let mut response = next.run(request).await;

    if let Err(e) = state.sessions.save(session.id(), &session.snapshot()).await {
        tracing::error!(error = %e, "session save failed; state from this request is lost");
    }

    if session.is_new() {
        let cookie = Cookie::build((cookie_name, session.id().to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build();
        if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    response
}

/// Self-healing slot initialization: before any handler runs, every
/// session-driver guard has its slot, created in the initial state if the
/// session lacked it. Handlers never need a presence check.
pub async fn auth_slots_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(session) = request.extensions().get::<Session>() {
        session.update(|data| data.ensure_slots(state.registry.session_guards()));
    }
    next.run(request).await
}
