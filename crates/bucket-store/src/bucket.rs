//! Bucket access for albums: prefix listings and single-key probes.

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use serde::{Deserialize, Serialize};

use crate::error::{BucketStoreError, Result};
use crate::listing::filter_listing;

/// Where the gallery's photos live.
///
/// ```toml
/// [bucket]
/// type = "s3"
/// endpoint = "http://localhost:9000"
/// bucket = "photos"
/// access_key = "..."
/// secret_key = "..."
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BucketConfig {
    /// Empty bucket held in memory, seeded through [`ObjectBucket::store`]
    #[default]
    Memory,

    /// Photos laid out as files under `path`
    Local { path: PathBuf },

    S3 {
        endpoint: String,
        access_key: String,
        secret_key: String,
        bucket: String,
        /// `us-east-1` when unset
        region: Option<String>,
    },
}

/// The two bucket operations albums depend on.
#[async_trait]
pub trait BucketStore: Debug + Send + Sync {
    /// List the object keys directly under `prefix`.
    ///
    /// The listing does not descend past the next delimiter, and the
    /// prefix's own directory marker is never returned.
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>>;

    /// Check whether a single object exists.
    async fn exists(&self, key: &str) -> Result<bool>;
}

/// [`BucketStore`] over any `object_store` backend.
#[derive(Debug, Clone)]
pub struct ObjectBucket {
    inner: Arc<dyn ObjectStore>,
}

impl ObjectBucket {
    pub async fn new(config: BucketConfig) -> Result<Self> {
        let inner: Arc<dyn ObjectStore> = match config {
            BucketConfig::Memory => Arc::new(InMemory::new()),
            BucketConfig::Local { path } => local_store(&path).await?,
            BucketConfig::S3 {
                endpoint,
                access_key,
                secret_key,
                bucket,
                region,
            } => {
                let store = AmazonS3Builder::new()
                    .with_endpoint(&endpoint)
                    .with_access_key_id(access_key)
                    .with_secret_access_key(secret_key)
                    .with_bucket_name(&bucket)
                    .with_region(region.as_deref().unwrap_or(DEFAULT_REGION))
                    .with_allow_http(endpoint.starts_with("http://"))
                    .build()
                    .map_err(|e| BucketStoreError::InvalidConfig(e.to_string()))?;
                let store: Arc<dyn ObjectStore> = Arc::new(store);
                check_bucket(store.as_ref(), &bucket).await?;
                tracing::info!(%endpoint, %bucket, "connected to s3 bucket");
                store
            }
        };

        Ok(Self { inner })
    }

    /// Wrap an already-built `object_store` backend.
    pub fn from_store(inner: Arc<dyn ObjectStore>) -> Self {
        Self { inner }
    }

    /// Access the underlying store, e.g. to seed it with objects.
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.inner
    }
}

const DEFAULT_REGION: &str = "us-east-1";

async fn local_store(path: &Path) -> Result<Arc<dyn ObjectStore>> {
    tokio::fs::create_dir_all(path).await?;
    let store = LocalFileSystem::new_with_prefix(path)
        .map_err(|e| BucketStoreError::InvalidConfig(e.to_string()))?;
    Ok(Arc::new(store))
}

/// A root listing fails fast on a missing bucket instead of at the first page load.
async fn check_bucket(store: &dyn ObjectStore, bucket: &str) -> Result<()> {
    match store.list_with_delimiter(None).await {
        Ok(_) => Ok(()),
        Err(object_store::Error::NotFound { .. }) => {
            Err(BucketStoreError::BucketNotFound(bucket.to_string()))
        }
        Err(e) if e.to_string().contains("NoSuchBucket") => {
            Err(BucketStoreError::BucketNotFound(bucket.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl BucketStore for ObjectBucket {
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        let location = ObjectPath::from(prefix);
        let listing = self.inner.list_with_delimiter(Some(&location)).await?;

        tracing::debug!(
            prefix,
            objects = listing.objects.len(),
            common_prefixes = listing.common_prefixes.len(),
            "listed bucket prefix"
        );

        let raw = listing
            .objects
            .into_iter()
            .map(|meta| meta.location.as_ref().to_string());
        Ok(filter_listing(prefix, raw))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let location = ObjectPath::from(key);
        match self.inner.head(&location).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
