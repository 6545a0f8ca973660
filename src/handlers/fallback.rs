//! Catch-all for unmatched paths
//!
//! API traffic gets a JSON error body; everything else gets the rendered
//! error page for its resolved domain.

use crate::view::Renderer;
use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::{json, Map};

pub async fn not_found(Extension(renderer): Extension<Renderer>, uri: Uri) -> Response {
    let mut segments = uri.path().split('/');
    segments.next();
    if segments.next() == Some("api") {
        let body = json!({ "message": "Request URL not found", "error": true });
        return (StatusCode::NOT_FOUND, Json(body)).into_response();
    }

    let mut locals = Map::new();
    locals.insert("message".to_string(), json!("Page Not Found"));
    renderer.render_error(StatusCode::NOT_FOUND, locals)
}
