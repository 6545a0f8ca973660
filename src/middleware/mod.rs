//! HTTP middleware for Warden Core
//!
//! The per-request pipeline, outermost first:
//! - session load/persist (and flash rotation)
//! - guard slot self-healing
//! - route context resolution (and canonical default-guard redirect)
//! - render stage binding the per-request view interceptor
//!
//! plus the `require_auth` / `require_guest` gates applied per route group.

pub mod require_auth;
pub mod route_context;
pub mod session;

pub use require_auth::{require_auth_middleware, require_guest_middleware};
pub use route_context::{render_middleware, route_context_middleware};
pub use session::{auth_slots_middleware, session_middleware};
