use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::GalleryState;

pub fn router(state: GalleryState) -> Router<GalleryState> {
    Router::new()
        .route("/livez", get(livez_handler))
        .route("/cache", get(cache_handler))
        .with_state(state)
}

pub async fn livez_handler() -> Response {
    let msg = serde_json::json!({"status": "ok"});
    (StatusCode::OK, Json(msg)).into_response()
}

#[derive(Debug, Serialize)]
struct AlbumCacheStatus {
    path: String,
    warm: bool,
    age_secs: Option<u64>,
    ttl_secs: u64,
}

/// Per-album key cache status, for operators.
#[tracing::instrument(skip(state))]
pub async fn cache_handler(State(state): State<GalleryState>) -> Response {
    let albums: Vec<_> = state
        .albums()
        .iter()
        .map(|album| {
            let cache = album.cache();
            AlbumCacheStatus {
                path: album.path().to_string(),
                warm: cache.is_warm(),
                age_secs: cache.last_update().map(|at| at.elapsed().as_secs()),
                ttl_secs: cache.ttl().as_secs(),
            }
        })
        .collect();

    let msg = serde_json::json!({"status": "ok", "albums": albums});
    (StatusCode::OK, Json(msg)).into_response()
}
