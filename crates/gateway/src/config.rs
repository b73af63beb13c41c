use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use bucket_store::BucketConfig;
use common::prelude::{AlbumConfig, KeyCacheConfig, SiteConfig, DEFAULT_TTL};

/// Gallery configuration file.
///
/// ```toml
/// [site]
/// canonical_url = "https://photos.example.com"
/// media_url = "https://cdn.example.com/"
///
/// [bucket]
/// type = "s3"
/// endpoint = "http://localhost:9000"
/// access_key = "minioadmin"
/// secret_key = "minioadmin"
/// bucket = "photos"
///
/// [[albums]]
/// path = "summer"
/// bucket_prefix = "albums/summer/"
/// album_title = "Summer"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryConfig {
    pub site: SiteConfig,
    #[serde(default)]
    pub bucket: BucketConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub albums: Vec<AlbumConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Seconds a listing is served before it's refreshed in the background
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Give up on a bucket listing after this many seconds
    #[serde(default)]
    pub fetch_timeout_secs: Option<u64>,
}

fn default_ttl_secs() -> u64 {
    DEFAULT_TTL.as_secs()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            fetch_timeout_secs: None,
        }
    }
}

impl CacheConfig {
    pub fn key_cache_config(&self) -> KeyCacheConfig {
        KeyCacheConfig {
            ttl: Duration::from_secs(self.ttl_secs),
            fetch_timeout: self.fetch_timeout_secs.map(Duration::from_secs),
        }
    }
}

impl GalleryConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config_toml = std::fs::read_to_string(path)?;
        Self::from_toml(&config_toml)
    }

    pub fn from_toml(config_toml: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(config_toml)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unable to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}
