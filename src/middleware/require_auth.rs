//! Authentication gates for mounted routes
//!
//! Both gates read the guard slot for the route-context domain and redirect
//! using that guard's configured targets. They never mutate auth state.

use crate::auth::Guard;
use crate::error::AppError;
use crate::routing::RouteContext;
use crate::server::AppState;
use crate::session::Session;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

/// Let only authenticated requests through; others go to the guard's
/// failure redirect (its login page).
pub async fn require_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let (guard, authenticated) = match slot_state(&state, &request) {
        Ok(pair) => pair,
        Err(response) => return response,
    };

    if !authenticated {
        return Redirect::to(&guard.redirect_fail).into_response();
    }
    next.run(request).await
}

/// Let only anonymous requests through; an already-authenticated visitor is
/// sent to the guard's success redirect instead of seeing the login page.
pub async fn require_guest_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let (guard, authenticated) = match slot_state(&state, &request) {
        Ok(pair) => pair,
        Err(response) => return response,
    };

    if authenticated {
        return Redirect::to(&guard.redirect_auth).into_response();
    }
    next.run(request).await
}

/// Resolve the request's guard and whether its slot is authenticated
fn slot_state(state: &AppState, request: &Request) -> Result<(Guard, bool), Response> {
    let context = request
        .extensions()
        .get::<RouteContext>()
        .cloned()
        .ok_or_else(|| {
            AppError::Session("route context missing from the pipeline".to_string()).into_response()
        })?;
    let guard = state
        .registry
        .get(&context.domain)
        .map_err(|e| e.into_response())?
        .clone();
    let authenticated = request
        .extensions()
        .get::<Session>()
        .map(|session| {
            session.get(|data| {
                data.slot(&guard.name)
                    .map(|slot| slot.is_authenticated)
                    .unwrap_or(false)
            })
        })
        .unwrap_or(false);

    Ok((guard, authenticated))
}
