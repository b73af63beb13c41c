use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;

/// 404 for a path that isn't an album or a photo in one.
///
/// JSON clients get `{"msg", "path"}`, everyone else a one-line text body.
pub fn not_found(uri: &Uri, headers: &HeaderMap) -> Response {
    let path = uri.path();
    tracing::debug!(path, "no album or photo at path");

    if wants_json(headers) {
        let msg = serde_json::json!({"msg": "not found", "path": path});
        return (StatusCode::NOT_FOUND, Json(msg)).into_response();
    }

    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format!("no album or photo at {}", path),
    )
        .into_response()
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"))
}
