use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use url::Url;

use common::prelude::{Album, PhotoView};

use super::not_found;
use crate::http_server::auth;
use crate::state::AlbumRoute;
use crate::GalleryState;

#[derive(Debug, Serialize)]
pub struct AlbumPage {
    pub path: String,
    pub meta_title: Option<String>,
    pub album_title: Option<String>,
    pub url: Url,
    pub cover: PhotoView,
    pub thumbnails: Vec<PhotoView>,
    pub photos: Vec<PhotoView>,
}

/// Serves `/<album>/` and `/<album>/<image>` for every configured album.
pub async fn handler(
    State(state): State<GalleryState>,
    method: Method,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let Some(AlbumRoute { album, slug }) = state.resolve(uri.path()) else {
        return not_found(&uri, &headers);
    };

    if let Err(response) = auth::authorize(&album, &headers) {
        return response;
    }

    match slug {
        None => album_page(&album).await,
        Some(slug) => photo(&state, &album, &slug, &uri, &headers).await,
    }
}

#[tracing::instrument(skip(album), fields(album = %album.path()))]
async fn album_page(album: &Album) -> Response {
    let listing = match album.listing().await {
        Ok(listing) => listing,
        Err(e) => {
            let msg = serde_json::json!({"msg": format!("unable to list album: {}", e)});
            return (StatusCode::BAD_GATEWAY, Json(msg)).into_response();
        }
    };

    let page = AlbumPage {
        path: album.path().to_string(),
        meta_title: album.meta_title().map(str::to_string),
        album_title: album.album_title().map(str::to_string),
        url: album.canonical_url(),
        cover: listing.cover().view(),
        thumbnails: listing.thumbnails().iter().map(|p| p.view()).collect(),
        photos: listing.photos.iter().map(|p| p.view()).collect(),
    };
    (StatusCode::OK, Json(page)).into_response()
}

#[tracing::instrument(skip(state, album, uri, headers), fields(album = %album.path()))]
async fn photo(
    state: &GalleryState,
    album: &Album,
    slug: &str,
    uri: &Uri,
    headers: &HeaderMap,
) -> Response {
    if !album.image_exists(slug).await {
        return not_found(uri, headers);
    }

    let view = state.site().photo_for_key(&album.image_key(slug)).view();
    (StatusCode::OK, Json(view)).into_response()
}
