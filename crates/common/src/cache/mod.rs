//! Stale-while-revalidate cache for an album's bucket listing
//!
//! Each [`Album`](crate::album::Album) owns exactly one [`KeyCache`]. The cache
//! holds the most recent listing as an immutable snapshot:
//!
//! - **Cold**: nothing has been fetched yet. The caller blocks on the refresh
//!   lock and fetches synchronously. Concurrent cold callers queue on the same
//!   lock and pick up the snapshot installed by whoever got there first.
//! - **Warm**: a snapshot exists and is handed back without touching the lock.
//!   Once the snapshot is older than the TTL a background task takes the lock,
//!   re-checks staleness and refetches. A failed background fetch leaves the
//!   old snapshot (and its timestamp) in place.
//!
//! At most one fetch per cache is in flight at any time, and at most one
//! refresh task exists no matter how many stale reads arrive while it runs.

mod fetcher;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tokio::time::Instant;

use bucket_store::BucketStoreError;

pub use fetcher::{KeyFetcher, PrefixFetcher};

/// How long a listing is served before a background refresh is attempted.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
pub struct KeyCacheConfig {
    /// Age after which a warm listing is considered stale
    pub ttl: Duration,
    /// Upper bound on a single bucket listing. `None` waits indefinitely.
    pub fetch_timeout: Option<Duration>,
}

impl Default for KeyCacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            fetch_timeout: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum KeyCacheError {
    #[error("failed to list bucket keys: {0}")]
    Fetch(#[from] BucketStoreError),
    #[error("bucket listing timed out after {0:?}")]
    Timeout(Duration),
}

/// A listing together with the time it was fetched.
///  Never mutated once installed.
struct Snapshot {
    keys: Arc<[String]>,
    fetched_at: Instant,
}

struct Inner {
    fetcher: Arc<dyn KeyFetcher>,
    config: KeyCacheConfig,
    current: RwLock<Option<Arc<Snapshot>>>,
    // serializes check -> fetch -> store, never reads
    refresh_lock: Mutex<()>,
    // set while a background refresh task is alive
    refreshing: AtomicBool,
}

/// Per-album cache of bucket keys.
///
/// Cloning is cheap and clones share the same snapshot and refresh lock.
#[derive(Clone)]
pub struct KeyCache {
    inner: Arc<Inner>,
}

impl KeyCache {
    pub fn new(fetcher: Arc<dyn KeyFetcher>, config: KeyCacheConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetcher,
                config,
                current: RwLock::new(None),
                refresh_lock: Mutex::new(()),
                refreshing: AtomicBool::new(false),
            }),
        }
    }

    /// Get the current listing.
    ///
    /// Blocks only when the cache is cold. A warm cache answers immediately and,
    /// if its listing has outlived the TTL, schedules a refresh that nobody
    /// waits on.
    pub async fn get_keys(&self) -> Result<Arc<[String]>, KeyCacheError> {
        match self.inner.snapshot() {
            Some(snapshot) => {
                if self.inner.is_stale(&snapshot) {
                    self.spawn_refresh();
                }
                Ok(snapshot.keys.clone())
            }
            None => self.inner.populate().await,
        }
    }

    /// When the current listing was fetched, if there is one.
    pub fn last_update(&self) -> Option<Instant> {
        self.inner.snapshot().map(|snapshot| snapshot.fetched_at)
    }

    pub fn is_warm(&self) -> bool {
        self.inner.current.read().is_some()
    }

    pub fn ttl(&self) -> Duration {
        self.inner.config.ttl
    }

    fn spawn_refresh(&self) {
        let Some(slot) = RefreshSlot::claim(&self.inner) else {
            return;
        };
        tokio::spawn(async move {
            slot.inner.refresh().await;
        });
    }
}

/// Ownership of the single background refresh. Released on drop, so a
/// cancelled or panicked task doesn't wedge the cache.
struct RefreshSlot {
    inner: Arc<Inner>,
}

impl RefreshSlot {
    fn claim(inner: &Arc<Inner>) -> Option<Self> {
        inner
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(Self {
            inner: inner.clone(),
        })
    }
}

impl Drop for RefreshSlot {
    fn drop(&mut self) {
        self.inner.refreshing.store(false, Ordering::Release);
    }
}

impl fmt::Debug for KeyCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyCache")
            .field("config", &self.inner.config)
            .field("last_update", &self.last_update())
            .finish()
    }
}

impl Inner {
    fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.current.read().clone()
    }

    fn is_stale(&self, snapshot: &Snapshot) -> bool {
        snapshot.fetched_at.elapsed() > self.config.ttl
    }

    /// Cold path. The caller waits for the fetch and sees its error.
    async fn populate(&self) -> Result<Arc<[String]>, KeyCacheError> {
        let _guard = self.refresh_lock.lock().await;

        // another cold caller may have filled the cache while we waited
        if let Some(snapshot) = self.snapshot() {
            return Ok(snapshot.keys.clone());
        }

        let keys = self.fetch().await?;
        tracing::debug!(keys = keys.len(), "populated cold key cache");
        Ok(self.install(keys))
    }

    /// Warm path, run in the background. Failures keep the stale listing.
    async fn refresh(&self) {
        let _guard = self.refresh_lock.lock().await;

        match self.snapshot() {
            Some(snapshot) if self.is_stale(&snapshot) => {}
            _ => {
                tracing::trace!("key cache already refreshed by a concurrent caller");
                return;
            }
        }

        match self.fetch().await {
            Ok(keys) => {
                tracing::debug!(keys = keys.len(), "refreshed stale key cache");
                self.install(keys);
            }
            Err(e) => {
                tracing::warn!(error = %e, "key cache refresh failed, serving stale listing");
            }
        }
    }

    async fn fetch(&self) -> Result<Vec<String>, KeyCacheError> {
        let fetch = self.fetcher.fetch();
        match self.config.fetch_timeout {
            Some(limit) => tokio::time::timeout(limit, fetch)
                .await
                .map_err(|_| KeyCacheError::Timeout(limit))?
                .map_err(KeyCacheError::from),
            None => fetch.await.map_err(KeyCacheError::from),
        }
    }

    fn install(&self, keys: Vec<String>) -> Arc<[String]> {
        let snapshot = Arc::new(Snapshot {
            keys: keys.into(),
            fetched_at: Instant::now(),
        });
        let keys = snapshot.keys.clone();
        *self.current.write() = Some(snapshot);
        keys
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use futures::future::join_all;

    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    /// Returns `["a/<n>.jpg"]` on the n-th call, failing on the listed calls.
    #[derive(Default)]
    struct CountingFetcher {
        calls: AtomicUsize,
        delay: Duration,
        fail_on: Vec<usize>,
    }

    impl CountingFetcher {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl KeyFetcher for CountingFetcher {
        async fn fetch(&self) -> Result<Vec<String>, BucketStoreError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail_on.contains(&call) {
                return Err(BucketStoreError::Io(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "bucket unavailable",
                )));
            }
            Ok(vec![format!("a/{}.jpg", call)])
        }
    }

    fn cache_with(fetcher: &Arc<CountingFetcher>) -> KeyCache {
        KeyCache::new(fetcher.clone(), KeyCacheConfig::default())
    }

    // give spawned refresh tasks a chance to finish
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cold_fetch_populates() {
        let fetcher = Arc::new(CountingFetcher::default());
        let cache = cache_with(&fetcher);
        assert!(!cache.is_warm());

        let keys = cache.get_keys().await.unwrap();
        assert_eq!(&*keys, ["a/1.jpg".to_string()]);
        assert!(cache.is_warm());
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_timeline() {
        let fetcher = Arc::new(CountingFetcher::default());
        let cache = cache_with(&fetcher);

        // t = 0
        let first = cache.get_keys().await.unwrap();
        assert_eq!(fetcher.calls(), 1);

        // t = +30m
        tokio::time::advance(30 * MINUTE).await;
        let keys = cache.get_keys().await.unwrap();
        assert_eq!(keys, first);
        assert_eq!(fetcher.calls(), 1);

        // t = +61m: stale value served, one refresh kicked off
        tokio::time::advance(31 * MINUTE).await;
        let keys = cache.get_keys().await.unwrap();
        assert_eq!(keys, first);
        settle().await;
        assert_eq!(fetcher.calls(), 2);

        // t = +62m: refreshed value visible, no further fetches
        tokio::time::advance(MINUTE).await;
        let keys = cache.get_keys().await.unwrap();
        assert_eq!(&*keys, ["a/2.jpg".to_string()]);
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_cold_calls_fetch_once() {
        let fetcher = Arc::new(CountingFetcher {
            delay: Duration::from_millis(100),
            ..Default::default()
        });
        let cache = cache_with(&fetcher);

        let results = join_all((0..16).map(|_| {
            let cache = cache.clone();
            async move { cache.get_keys().await }
        }))
        .await;

        assert_eq!(fetcher.calls(), 1);
        for keys in results {
            assert_eq!(&*keys.unwrap(), ["a/1.jpg".to_string()]);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_stale_reads_refresh_once() {
        let fetcher = Arc::new(CountingFetcher {
            delay: Duration::from_millis(10),
            ..Default::default()
        });
        let cache = cache_with(&fetcher);
        cache.get_keys().await.unwrap();

        tokio::time::advance(61 * MINUTE).await;
        for _ in 0..8 {
            let keys = cache.get_keys().await.unwrap();
            assert_eq!(&*keys, ["a/1.jpg".to_string()]);
        }
        settle().await;

        assert_eq!(fetcher.calls(), 2);
        let keys = cache.get_keys().await.unwrap();
        assert_eq!(&*keys, ["a/2.jpg".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_reads_during_slow_refresh_spawn_one_task() {
        let fetcher = Arc::new(CountingFetcher {
            delay: 24 * 60 * MINUTE,
            ..Default::default()
        });
        let cache = cache_with(&fetcher);
        // warm without waiting out the delay
        cache.inner.install(vec!["a/0.jpg".to_string()]);

        tokio::time::advance(61 * MINUTE).await;
        for _ in 0..1000 {
            let keys = cache.get_keys().await.unwrap();
            assert_eq!(&*keys, ["a/0.jpg".to_string()]);
            tokio::task::yield_now().await;
        }

        // the cache handle plus the one refresh task
        assert_eq!(Arc::strong_count(&cache.inner), 2);
        assert!(cache.inner.refreshing.load(Ordering::Acquire));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_keeps_stale_listing() {
        let fetcher = Arc::new(CountingFetcher {
            fail_on: vec![2],
            ..Default::default()
        });
        let cache = cache_with(&fetcher);

        let first = cache.get_keys().await.unwrap();
        let fetched_at = cache.last_update().unwrap();

        tokio::time::advance(61 * MINUTE).await;
        let keys = cache.get_keys().await.unwrap();
        assert_eq!(keys, first);
        settle().await;

        assert_eq!(fetcher.calls(), 2);
        assert_eq!(cache.last_update(), Some(fetched_at));

        // still stale, so the next read serves the old listing and tries again
        let keys = cache.get_keys().await.unwrap();
        assert_eq!(keys, first);
        settle().await;
        assert_eq!(fetcher.calls(), 3);
        assert_eq!(&*cache.get_keys().await.unwrap(), ["a/3.jpg".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cold_failure_stores_nothing() {
        let fetcher = Arc::new(CountingFetcher {
            fail_on: vec![1],
            ..Default::default()
        });
        let cache = cache_with(&fetcher);

        let err = cache.get_keys().await.unwrap_err();
        assert!(matches!(err, KeyCacheError::Fetch(_)));
        assert!(!cache.is_warm());
        assert!(cache.last_update().is_none());

        let keys = cache.get_keys().await.unwrap();
        assert_eq!(&*keys, ["a/2.jpg".to_string()]);
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_warm_reads_do_not_wait_for_refresh() {
        let fetcher = Arc::new(CountingFetcher {
            delay: 10 * MINUTE,
            ..Default::default()
        });
        let cache = cache_with(&fetcher);
        cache.get_keys().await.unwrap();

        tokio::time::advance(61 * MINUTE).await;
        cache.get_keys().await.unwrap();
        // let the refresh task take the lock and start its slow fetch
        tokio::task::yield_now().await;

        let keys = tokio::time::timeout(Duration::from_millis(1), cache.get_keys())
            .await
            .expect("warm read blocked on refresh")
            .unwrap();
        assert_eq!(&*keys, ["a/1.jpg".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_timeout() {
        let fetcher = Arc::new(CountingFetcher {
            delay: MINUTE,
            ..Default::default()
        });
        let cache = KeyCache::new(
            fetcher.clone(),
            KeyCacheConfig {
                fetch_timeout: Some(Duration::from_secs(5)),
                ..Default::default()
            },
        );

        let err = cache.get_keys().await.unwrap_err();
        assert!(matches!(err, KeyCacheError::Timeout(_)));
        assert!(!cache.is_warm());
    }
}
