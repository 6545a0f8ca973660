//! Route source resolution
//!
//! Derives, once per request, which guard domain and which logical
//! controller the request belongs to. The context is computed at the start
//! of the pipeline, inserted into request extensions, and immutable
//! afterward.

use crate::auth::GuardRegistry;

/// Request-scoped routing context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteContext {
    /// Guard name inferred from the request path
    pub domain: String,
    /// Second path segment under the domain, if any
    pub controller: Option<String>,
}

/// Resolve the request path to exactly one `(domain, controller)` pair.
///
/// The first segment selects the domain when it literally names a configured
/// non-default guard; otherwise the default guard is unshifted onto the
/// segment list and the unrecognized segment becomes the controller. No
/// other signal (host header, query string) participates.
pub fn resolve(path: &str, registry: &GuardRegistry) -> RouteContext {
    let mut segments: Vec<&str> = path.split('/').collect();
    if segments.first() == Some(&"") {
        segments.remove(0);
    }

    let first = segments.first().map(|s| s.to_lowercase());
    let named_guard = first
        .as_deref()
        .filter(|s| *s != registry.default_guard() && registry.contains(s));
    if named_guard.is_none() {
        segments.insert(0, registry.default_guard());
    }

    let domain = segments[0].to_lowercase();
    let controller = segments
        .get(1)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    RouteContext { domain, controller }
}
