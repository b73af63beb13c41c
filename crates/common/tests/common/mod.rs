//! Shared test utilities for album integration tests
#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use url::Url;

use bucket_store::{filter_listing, BucketStore, BucketStoreError, Result};
use common::prelude::*;

/// In-process bucket that records how often it is listed.
#[derive(Debug, Default)]
pub struct MockBucket {
    raw_keys: Mutex<Vec<String>>,
    list_calls: AtomicUsize,
    head_calls: AtomicUsize,
    failing: AtomicBool,
    delay: Mutex<Duration>,
}

impl MockBucket {
    pub fn with_keys<I, S>(keys: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let bucket = Self::default();
        bucket.set_keys(keys);
        Arc::new(bucket)
    }

    pub fn set_keys<I, S>(&self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.raw_keys.lock() = keys.into_iter().map(Into::into).collect();
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn head_calls(&self) -> usize {
        self.head_calls.load(Ordering::SeqCst)
    }

    fn unavailable() -> BucketStoreError {
        BucketStoreError::Io(io::Error::new(
            io::ErrorKind::TimedOut,
            "bucket unavailable",
        ))
    }
}

#[async_trait]
impl BucketStore for MockBucket {
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }

        let raw: Vec<String> = self
            .raw_keys
            .lock()
            .iter()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        Ok(filter_listing(prefix, raw))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        Ok(self.raw_keys.lock().iter().any(|k| k == key))
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn site(bucket: Arc<MockBucket>) -> Arc<Site> {
    let config = SiteConfig {
        canonical_url: Url::parse("https://photos.example.com").unwrap(),
        media_url: Url::parse("https://cdn.example.com/").unwrap(),
        thumbnail_url: None,
        auth_user: None,
        auth_pass: None,
    };
    Arc::new(Site::new(config, bucket))
}

/// Set up an album over `a/` backed by a mock bucket holding `keys`.
pub fn setup_album<I, S>(keys: I) -> (Album, Arc<MockBucket>)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    init_tracing();
    let bucket = MockBucket::with_keys(keys);
    let album = Album::new(site(bucket.clone()), AlbumConfig::new("a", "a/")).unwrap();
    (album, bucket)
}

/// Keys `a/1.jpg ..= a/<n>.jpg` plus the prefix's own marker.
pub fn numbered_keys(n: usize) -> Vec<String> {
    std::iter::once("a/".to_string())
        .chain((1..=n).map(|i| format!("a/{}.jpg", i)))
        .collect()
}
