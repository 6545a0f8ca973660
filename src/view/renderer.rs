//! The view resolution interceptor
//!
//! Wraps the render primitive for one request: a short view name is expanded
//! into `<Domain>/<Controller>/<View>`, existence-checked against the
//! manifest, and rendered at 200; a miss renders the error template at 404
//! instead. The renderer commits at most once per request.

use crate::routing::RouteContext;
use crate::view::resolver::TemplateResolver;
use crate::view::ucfirst;
use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Sentinel view name that always renders the error template
pub const ERROR_VIEW: &str = "Error";

/// Shown when the error template itself is missing from the manifest
const BUILTIN_ERROR_BODY: &str =
    "<!DOCTYPE html><html><head><title>Error</title></head>\
     <body><h1>{{ message }}</h1><p><a href=\"/{{ home }}\">Back</a></p></body></html>";

/// Per-request render handle
///
/// Cloned freely within one request; all clones share the commit flag, so
/// a second render after the first response is a logged no-op.
#[derive(Clone)]
pub struct Renderer {
    resolver: Arc<dyn TemplateResolver>,
    route: RouteContext,
    default_controller: String,
    committed: Arc<AtomicBool>,
}

impl Renderer {
    pub fn new(
        resolver: Arc<dyn TemplateResolver>,
        route: RouteContext,
        default_controller: String,
    ) -> Self {
        Self {
            resolver,
            route,
            default_controller,
            committed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn route(&self) -> &RouteContext {
        &self.route
    }

    /// Render a short view name relative to the resolved domain/controller.
    ///
    /// The status code is decided before any bytes are produced: 200 when
    /// the computed template exists, otherwise the supplied view and locals
    /// are discarded and the error template renders at 404.
    pub fn render(&self, view: &str, locals: Map<String, Value>) -> Response {
        if view == ERROR_VIEW {
            return self.render_error(StatusCode::NOT_FOUND, locals);
        }

        let controller = self
            .route
            .controller
            .clone()
            .unwrap_or_else(|| self.default_controller.clone());
        let key = format!(
            "{}/{}/{}",
            ucfirst(&self.route.domain),
            ucfirst(&controller),
            view
        );

        match self.resolver.resolve(&key) {
            Some(body) => self.commit(StatusCode::OK, &body, &locals),
            None => {
                let mut locals = Map::new();
                locals.insert(
                    "message".to_string(),
                    Value::String("Page Not Found".to_string()),
                );
                self.render_error(StatusCode::NOT_FOUND, locals)
            }
        }
    }

    /// Render the error template, injecting `home = domain` when the caller
    /// did not supply one.
    pub fn render_error(&self, status: StatusCode, mut locals: Map<String, Value>) -> Response {
        locals
            .entry("home".to_string())
            .or_insert_with(|| Value::String(self.route.domain.clone()));

        let body = self
            .resolver
            .resolve(ERROR_VIEW)
            .unwrap_or_else(|| Arc::from(BUILTIN_ERROR_BODY));
        self.commit(status, &body, &locals)
    }

    fn commit(&self, status: StatusCode, template: &str, locals: &Map<String, Value>) -> Response {
        if self.committed.swap(true, Ordering::SeqCst) {
            // Headers already sent: swallow the second render entirely.
            tracing::error!(
                domain = %self.route.domain,
                "render called after the response was committed; ignoring"
            );
            return Response::new(Body::empty());
        }

        let html = interpolate(template, locals);
        let mut response = Response::new(Body::from(html));
        *response.status_mut() = status;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );
        response
    }
}

/// Replace `{{ key }}` placeholders with values from the locals map.
///
/// Deliberately minimal: no conditionals, no loops, unknown placeholders are
/// left as-is. This is placeholder interpolation, not a templating language.
fn interpolate(template: &str, locals: &Map<String, Value>) -> String {
    let mut output = template.to_string();
    for (key, value) in locals {
        let needle = format!("{{{{ {} }}}}", key);
        if output.contains(&needle) {
            output = output.replace(&needle, &value_to_string(value));
        }
    }
    output
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::resolver::ManifestTemplateResolver;
    use serde_json::json;

    fn route(domain: &str, controller: Option<&str>) -> RouteContext {
        RouteContext {
            domain: domain.to_string(),
            controller: controller.map(|s| s.to_string()),
        }
    }

    fn manifest() -> ManifestTemplateResolver {
        let mut manifest = ManifestTemplateResolver::new();
        manifest.insert("Admin/Dashboard/index", "<h1>{{ title }}</h1>");
        manifest.insert("Error", "<p>{{ message }}</p><a href=\"/{{ home }}\">home</a>");
        manifest
    }

    fn locals(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_existing_view_renders_at_200() {
        let renderer = Renderer::new(
            Arc::new(manifest()),
            route("admin", Some("dashboard")),
            "home".to_string(),
        );

        let response = renderer.render("index", locals(&[("title", json!("Control Room"))]));

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
        assert_eq!(body_text(response).await, "<h1>Control Room</h1>");
    }

    #[tokio::test]
    async fn test_missing_view_falls_back_to_error_template() {
        let renderer = Renderer::new(
            Arc::new(manifest()),
            route("admin", Some("reports")),
            "home".to_string(),
        );

        let response = renderer.render("index", locals(&[("title", json!("discarded"))]));

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_text(response).await;
        assert!(body.contains("Page Not Found"));
        assert!(body.contains("href=\"/admin\""));
        assert!(!body.contains("discarded"));
    }

    #[tokio::test]
    async fn test_error_sentinel_always_renders_error() {
        let renderer = Renderer::new(
            Arc::new(manifest()),
            route("user", None),
            "home".to_string(),
        );

        let response = renderer.render(ERROR_VIEW, locals(&[("message", json!("Nope"))]));

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_text(response).await;
        assert!(body.contains("Nope"));
        assert!(body.contains("href=\"/user\""));
    }

    #[tokio::test]
    async fn test_error_keeps_caller_supplied_home() {
        let renderer = Renderer::new(
            Arc::new(manifest()),
            route("user", None),
            "home".to_string(),
        );

        let response = renderer.render_error(
            StatusCode::NOT_FOUND,
            locals(&[("message", json!("x")), ("home", json!("admin"))]),
        );

        assert!(body_text(response).await.contains("href=\"/admin\""));
    }

    #[tokio::test]
    async fn test_missing_controller_uses_default() {
        let mut manifest = ManifestTemplateResolver::new();
        manifest.insert("User/Home/index", "welcome");

        let renderer = Renderer::new(Arc::new(manifest), route("user", None), "home".to_string());
        let response = renderer.render("index", Map::new());

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "welcome");
    }

    #[tokio::test]
    async fn test_second_render_is_swallowed() {
        let renderer = Renderer::new(
            Arc::new(manifest()),
            route("admin", Some("dashboard")),
            "home".to_string(),
        );

        let first = renderer.render("index", Map::new());
        assert_eq!(first.status(), StatusCode::OK);

        // Clones share the commit flag, as all handles within a request do.
        let second = renderer.clone().render("index", Map::new());
        assert!(body_text(second).await.is_empty());
    }

    #[tokio::test]
    async fn test_builtin_error_body_when_template_missing() {
        let renderer = Renderer::new(
            Arc::new(ManifestTemplateResolver::new()),
            route("user", None),
            "home".to_string(),
        );

        let response = renderer.render("index", Map::new());
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("Page Not Found"));
    }

    #[test]
    fn test_interpolate_leaves_unknown_placeholders() {
        let result = interpolate(
            "{{ known }} and {{ unknown }}",
            &locals(&[("known", json!("yes"))]),
        );
        assert_eq!(result, "yes and {{ unknown }}");
    }
}
