use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::future::join_all;
use serde::Serialize;
use url::Url;

use common::prelude::{Album, PhotoView};

use crate::GalleryState;

#[derive(Debug, Serialize)]
pub struct AlbumSummary {
    pub path: String,
    pub meta_title: Option<String>,
    pub album_title: Option<String>,
    pub url: Url,
    pub cover: PhotoView,
}

impl AlbumSummary {
    async fn load(album: &Album) -> Self {
        Self {
            path: album.path().to_string(),
            meta_title: album.meta_title().map(str::to_string),
            album_title: album.album_title().map(str::to_string),
            url: album.canonical_url(),
            cover: album.cover_photo().await.view(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IndexPage {
    pub url: Url,
    pub albums: Vec<AlbumSummary>,
}

/// Public index of albums, each with its cover photo.
#[tracing::instrument(skip(state))]
pub async fn handler(State(state): State<GalleryState>) -> Response {
    let albums = join_all(state.index_albums().map(|album| AlbumSummary::load(album))).await;
    let page = IndexPage {
        url: state.site().canonical_url().clone(),
        albums,
    };
    (StatusCode::OK, Json(page)).into_response()
}
