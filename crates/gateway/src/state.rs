use std::collections::HashSet;
use std::sync::Arc;

use percent_encoding::percent_decode_str;

use bucket_store::{BucketStore, BucketStoreError, ObjectBucket};
use common::prelude::{canonicalize_path, Album, AlbumError, Site};

use crate::config::GalleryConfig;

/// Shared gateway state: the site and every configured album.
#[derive(Debug, Clone)]
pub struct State {
    site: Arc<Site>,
    albums: Arc<Vec<Arc<Album>>>,
}

/// An album matched from a request path, optionally pointing at one image.
#[derive(Debug, Clone)]
pub struct AlbumRoute {
    pub album: Arc<Album>,
    pub slug: Option<String>,
}

impl State {
    pub async fn from_config(config: &GalleryConfig) -> Result<Self, StateSetupError> {
        let bucket = ObjectBucket::new(config.bucket.clone()).await?;
        Self::from_parts(config, Arc::new(bucket))
    }

    /// Build state over an already constructed bucket.
    pub fn from_parts(
        config: &GalleryConfig,
        bucket: Arc<dyn BucketStore>,
    ) -> Result<Self, StateSetupError> {
        let site = Arc::new(Site::new(config.site.clone(), bucket));
        let cache_config = config.cache.key_cache_config();

        let mut seen = HashSet::new();
        let mut albums = Vec::with_capacity(config.albums.len());
        for album_config in &config.albums {
            let path = album_config.path.clone();
            let album =
                Album::with_cache_config(site.clone(), album_config.clone(), cache_config.clone())
                    .map_err(|source| StateSetupError::Album { path, source })?;

            if !seen.insert(album.path().to_string()) {
                return Err(StateSetupError::DuplicateAlbum(album.path().to_string()));
            }

            tracing::info!(
                path = %album.path(),
                bucket_prefix = %album.bucket_prefix(),
                in_index = album.in_index(),
                has_auth = album.has_auth(),
                "loaded album"
            );
            albums.push(Arc::new(album));
        }

        Ok(Self {
            site,
            albums: Arc::new(albums),
        })
    }

    pub fn site(&self) -> &Arc<Site> {
        &self.site
    }

    pub fn albums(&self) -> &[Arc<Album>] {
        &self.albums
    }

    /// Albums shown on the public index.
    pub fn index_albums(&self) -> impl Iterator<Item = &Arc<Album>> {
        self.albums.iter().filter(|album| album.in_index())
    }

    /// Match a request path to the album it belongs to.
    ///
    /// `/summer` and `/summer/` address the album itself, `/summer/1.jpg` an
    /// image in it. When albums nest, the longest album path wins.
    pub fn resolve(&self, request_path: &str) -> Option<AlbumRoute> {
        let decoded = percent_decode_str(request_path).decode_utf8_lossy();
        let request = decoded.trim_start_matches('/');
        if request.is_empty() {
            return None;
        }

        self.albums
            .iter()
            .filter_map(|album| {
                let root = album.path().trim_start_matches('/');
                if canonicalize_path(request) == root {
                    return Some((root.len(), album, None));
                }
                let slug = request.strip_prefix(root)?;
                if slug.is_empty() || slug.contains('/') {
                    return None;
                }
                Some((root.len(), album, Some(slug.to_string())))
            })
            .max_by_key(|(len, _, _)| *len)
            .map(|(_, album, slug)| AlbumRoute {
                album: album.clone(),
                slug,
            })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("bucket setup error: {0}")]
    Bucket(#[from] BucketStoreError),
    #[error("invalid album '{path}': {source}")]
    Album {
        path: String,
        #[source]
        source: AlbumError,
    },
    #[error("album path '{0}' is configured more than once")]
    DuplicateAlbum(String),
}
