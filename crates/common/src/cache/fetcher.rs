use std::sync::Arc;

use async_trait::async_trait;

use bucket_store::{BucketStore, BucketStoreError};

/// Source of fresh listings for a [`KeyCache`](super::KeyCache).
#[async_trait]
pub trait KeyFetcher: Send + Sync {
    async fn fetch(&self) -> Result<Vec<String>, BucketStoreError>;
}

/// Lists the keys under a single bucket prefix.
#[derive(Debug, Clone)]
pub struct PrefixFetcher {
    store: Arc<dyn BucketStore>,
    prefix: String,
}

impl PrefixFetcher {
    pub fn new(store: Arc<dyn BucketStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl KeyFetcher for PrefixFetcher {
    async fn fetch(&self) -> Result<Vec<String>, BucketStoreError> {
        tracing::debug!(prefix = %self.prefix, "listing album keys from bucket");
        self.store.list_keys(&self.prefix).await
    }
}
