//! Site-wide settings shared by every album.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

use bucket_store::BucketStore;

use crate::photo::{ErrorPhoto, Photo, Renderable};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Public URL the gallery is served under
    pub canonical_url: Url,
    /// Base URL full-size images are served from, keys are joined onto it
    pub media_url: Url,
    /// Base URL for thumbnails, defaults to `media_url`
    #[serde(default)]
    pub thumbnail_url: Option<Url>,
    #[serde(default)]
    pub auth_user: Option<String>,
    #[serde(default)]
    pub auth_pass: Option<String>,
}

/// Owns bucket access and the site-level auth defaults.
pub struct Site {
    canonical_url: Url,
    media_url: Url,
    thumbnail_url: Url,
    auth_user: String,
    auth_pass: String,
    bucket: Arc<dyn BucketStore>,
}

impl Site {
    pub fn new(config: SiteConfig, bucket: Arc<dyn BucketStore>) -> Self {
        let media_url = with_trailing_slash(config.media_url);
        let thumbnail_url = config
            .thumbnail_url
            .map(with_trailing_slash)
            .unwrap_or_else(|| media_url.clone());

        Self {
            canonical_url: config.canonical_url,
            media_url,
            thumbnail_url,
            auth_user: config.auth_user.unwrap_or_default(),
            auth_pass: config.auth_pass.unwrap_or_default(),
            bucket,
        }
    }

    pub fn bucket(&self) -> &Arc<dyn BucketStore> {
        &self.bucket
    }

    pub fn canonical_url(&self) -> &Url {
        &self.canonical_url
    }

    pub fn has_auth(&self) -> bool {
        !self.auth_user.is_empty() && !self.auth_pass.is_empty()
    }

    pub fn auth_user(&self) -> &str {
        &self.auth_user
    }

    pub fn auth_pass(&self) -> &str {
        &self.auth_pass
    }

    /// Build the display object for a bucket key.
    pub fn photo_for_key(&self, key: &str) -> Arc<dyn Renderable> {
        match (self.thumbnail_url.join(key), self.media_url.join(key)) {
            (Ok(thumbnail), Ok(full)) => Arc::new(Photo::new(key, thumbnail, full)),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(key, error = %e, "unable to build photo url");
                Arc::new(ErrorPhoto)
            }
        }
    }
}

impl fmt::Debug for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Site")
            .field("canonical_url", &self.canonical_url)
            .field("media_url", &self.media_url)
            .field("thumbnail_url", &self.thumbnail_url)
            .field("has_auth", &self.has_auth())
            .field("bucket", &self.bucket)
            .finish()
    }
}

// Url::join replaces the last segment unless the base ends in a slash
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
