use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use common::prelude::Album;

/// Enforce HTTP Basic auth on albums that require it.
///
/// The album's own credentials win over the site's.
#[allow(clippy::result_large_err)]
pub fn authorize(album: &Album, headers: &HeaderMap) -> Result<(), Response> {
    if !album.has_auth() {
        return Ok(());
    }

    match basic_credentials(headers) {
        Some((user, pass)) if user == album.auth_user() && pass == album.auth_pass() => Ok(()),
        Some((user, _)) => {
            tracing::debug!(album = %album.path(), user = %user, "rejected album credentials");
            Err(unauthorized(album))
        }
        None => Err(unauthorized(album)),
    }
}

fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

fn unauthorized(album: &Album) -> Response {
    let challenge = HeaderValue::from_str(&format!("Basic realm=\"{}\"", album.path()))
        .unwrap_or_else(|_| HeaderValue::from_static("Basic"));
    let msg = serde_json::json!({"msg": "authentication required"});
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, challenge)],
        Json(msg),
    )
        .into_response()
}
