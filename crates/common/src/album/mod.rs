//! Albums: a gallery page backed by a bucket key prefix
//!
//! An [`Album`] is validated and canonicalized once at construction and then
//! serves its photos through its own [`KeyCache`]. The derived views used by
//! the rendering layer ([`Album::cover_photo`], [`Album::thumbnails`]) never
//! fail; listing errors are logged and degrade to a placeholder or nothing.

mod config;

use std::sync::Arc;

use url::Url;

use bucket_store::DELIMITER;

use crate::cache::{KeyCache, KeyCacheConfig, KeyCacheError, PrefixFetcher};
use crate::photo::{ErrorPhoto, Renderable};
use crate::site::Site;

pub use config::AlbumConfig;

/// Photos shown next to the cover on index pages, not counting the cover.
pub const MAX_THUMBNAILS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum AlbumError {
    #[error("'path' is a required parameter that must have a valid value")]
    MissingPath,
    #[error(
        "album '{0}' requires authentication and can't be shown in the index, add authentication to the site instead"
    )]
    AuthInIndex(String),
}

#[derive(Debug)]
pub struct Album {
    site: Arc<Site>,

    path: String,
    bucket_prefix: String,

    auth_user: String,
    auth_pass: String,

    meta_title: Option<String>,
    album_title: Option<String>,

    in_index: bool,

    cache: KeyCache,
}

impl Album {
    pub fn new(site: Arc<Site>, config: AlbumConfig) -> Result<Self, AlbumError> {
        Self::with_cache_config(site, config, KeyCacheConfig::default())
    }

    pub fn with_cache_config(
        site: Arc<Site>,
        config: AlbumConfig,
        cache_config: KeyCacheConfig,
    ) -> Result<Self, AlbumError> {
        let auth_user = config.auth_user.unwrap_or_default();
        let auth_pass = config.auth_pass.unwrap_or_default();

        if config.path.is_empty() {
            return Err(AlbumError::MissingPath);
        }
        if config.in_index && own_auth(&auth_user, &auth_pass) {
            return Err(AlbumError::AuthInIndex(config.path));
        }

        let fetcher = PrefixFetcher::new(site.bucket().clone(), config.bucket_prefix.clone());
        let cache = KeyCache::new(Arc::new(fetcher), cache_config);

        Ok(Self {
            site,
            path: canonicalize_path(&config.path),
            bucket_prefix: config.bucket_prefix,
            auth_user,
            auth_pass,
            meta_title: config.meta_title,
            album_title: config.album_title,
            in_index: config.in_index,
            cache,
        })
    }

    /// Canonical path, always ending in `/`
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn bucket_prefix(&self) -> &str {
        &self.bucket_prefix
    }

    pub fn in_index(&self) -> bool {
        self.in_index
    }

    pub fn meta_title(&self) -> Option<&str> {
        self.meta_title.as_deref()
    }

    pub fn album_title(&self) -> Option<&str> {
        self.album_title.as_deref()
    }

    pub fn cache(&self) -> &KeyCache {
        &self.cache
    }

    pub fn canonical_url(&self) -> Url {
        let mut url = self.site.canonical_url().clone();
        url.set_path(&self.path);
        url
    }

    /// Whether this album carries credentials of its own.
    pub fn has_own_auth(&self) -> bool {
        own_auth(&self.auth_user, &self.auth_pass)
    }

    // An album inherits the site's auth settings unless it overrides them. If
    //  both the site and album have auth, the album's credentials win.
    pub fn has_auth(&self) -> bool {
        self.site.has_auth() || self.has_own_auth()
    }

    pub fn auth_user(&self) -> &str {
        if self.auth_user.is_empty() {
            self.site.auth_user()
        } else {
            &self.auth_user
        }
    }

    pub fn auth_pass(&self) -> &str {
        if self.auth_pass.is_empty() {
            self.site.auth_pass()
        } else {
            &self.auth_pass
        }
    }

    /// Every photo in the album, in bucket order.
    pub async fn all_photos(&self) -> Result<Vec<Arc<dyn Renderable>>, KeyCacheError> {
        Ok(self.listing().await?.photos)
    }

    /// One cached listing, from which the cover and thumbnails are derived
    /// consistently.
    pub async fn listing(&self) -> Result<AlbumListing, KeyCacheError> {
        let keys = self.cache.get_keys().await.map_err(|e| {
            tracing::error!(album = %self.path, error = %e, "unable to get image keys from bucket");
            e
        })?;

        let photos = keys.iter().map(|key| self.site.photo_for_key(key)).collect();
        Ok(AlbumListing { photos })
    }

    /// The first photo, or an [`ErrorPhoto`] if there is none.
    pub async fn cover_photo(&self) -> Arc<dyn Renderable> {
        match self.listing().await {
            Ok(listing) => listing.cover(),
            Err(e) => {
                tracing::warn!(album = %self.path, error = %e, "unable to get cover photo");
                Arc::new(ErrorPhoto)
            }
        }
    }

    /// Up to [`MAX_THUMBNAILS`] photos following the cover.
    pub async fn thumbnails(&self) -> Vec<Arc<dyn Renderable>> {
        match self.listing().await {
            Ok(listing) => listing.thumbnails(),
            Err(e) => {
                tracing::warn!(album = %self.path, error = %e, "unable to get thumbnail photos");
                Vec::new()
            }
        }
    }

    /// Probe the bucket for a single image without touching the cache.
    ///
    /// Any probe failure is reported as a missing image.
    pub async fn image_exists(&self, slug: &str) -> bool {
        let key = self.image_key(slug);
        match self.site.bucket().exists(&key).await {
            Ok(exists) => exists,
            Err(e) => {
                tracing::debug!(key = %key, error = %e, "image probe failed");
                false
            }
        }
    }

    /// Bucket key an image slug in this album maps to.
    pub fn image_key(&self, slug: &str) -> String {
        let prefix = self.bucket_prefix.trim_end_matches(DELIMITER);
        if prefix.is_empty() {
            slug.to_string()
        } else {
            format!("{}{}{}", prefix, DELIMITER, slug)
        }
    }
}

/// Photos from a single snapshot of an album's listing.
#[derive(Debug, Clone)]
pub struct AlbumListing {
    pub photos: Vec<Arc<dyn Renderable>>,
}

impl AlbumListing {
    pub fn cover(&self) -> Arc<dyn Renderable> {
        self.photos
            .first()
            .cloned()
            .unwrap_or_else(|| Arc::new(ErrorPhoto))
    }

    pub fn thumbnails(&self) -> Vec<Arc<dyn Renderable>> {
        self.photos
            .iter()
            .skip(1)
            .take(MAX_THUMBNAILS)
            .cloned()
            .collect()
    }
}

fn own_auth(user: &str, pass: &str) -> bool {
    !user.is_empty() && !pass.is_empty()
}

/// Append the path delimiter if it's missing. Idempotent.
pub fn canonicalize_path(path: &str) -> String {
    if path.ends_with(DELIMITER) {
        path.to_string()
    } else {
        format!("{}{}", path, DELIMITER)
    }
}
