//! Cache-aside resolution of short codes.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use super::settings::{ServiceSettings, within_cache_deadline, within_store_deadline};
use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::base62;
use crate::utils::scheme::ensure_scheme;

/// Where the long URL of a resolution came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    Cache,
    Store,
}

/// What happened to the click produced by a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickDispatch {
    /// Handed to the click worker.
    Queued,
    /// Queue full or closed; this click will not be counted.
    Dropped,
}

/// A resolved short code.
///
/// `long_url` is the primary result; `click` only reports the counter side
/// effect and never changes the redirect target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Absolute redirect target, scheme already filled in.
    pub long_url: String,
    pub source: ResolutionSource,
    pub click: ClickDispatch,
}

/// Resolves short codes through the cache, falling back to the store.
///
/// The cache is trusted on a hit and not re-checked against the store.
/// Every successful resolution queues exactly one click for the counter.
pub struct Resolver<R: ?Sized = dyn UrlRepository> {
    repository: Arc<R>,
    cache: Arc<dyn CacheService>,
    click_sender: mpsc::Sender<ClickEvent>,
    settings: ServiceSettings,
}

impl<R: UrlRepository + ?Sized> Resolver<R> {
    /// Creates a new resolver.
    pub fn new(
        repository: Arc<R>,
        cache: Arc<dyn CacheService>,
        click_sender: mpsc::Sender<ClickEvent>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            repository,
            cache,
            click_sender,
            settings,
        }
    }

    /// Resolves `code` to its long URL.
    ///
    /// Returns `Ok(None)` when no record has this code; no click is counted
    /// in that case.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] when the cache misses and the store
    /// lookup fails or times out. Cache failures alone are never errors.
    pub async fn resolve(&self, code: &str) -> Result<Option<Resolution>, AppError> {
        // codes are always produced by base62::encode
        if base62::decode(code).is_none() {
            debug!("Rejected malformed code {:?}", code);
            return Ok(None);
        }

        let (long_url, source) = match self.lookup_cache(code).await {
            Some(url) => (url, ResolutionSource::Cache),
            None => {
                let record = within_store_deadline(
                    self.settings.store_timeout,
                    self.repository.find_by_code(code),
                )
                .await?;

                let Some(record) = record else {
                    debug!("No URL for code {}", code);
                    return Ok(None);
                };

                if self.settings.refill_cache_on_miss {
                    self.refill_cache(code, &record.long_url);
                }

                (record.long_url, ResolutionSource::Store)
            }
        };

        let click = self.dispatch_click(code);

        Ok(Some(Resolution {
            long_url: ensure_scheme(&long_url),
            source,
            click,
        }))
    }

    /// Sender side of the click queue, for health reporting.
    pub fn click_queue(&self) -> &mpsc::Sender<ClickEvent> {
        &self.click_sender
    }

    /// Whether the durable store answers within the store deadline.
    pub async fn store_healthy(&self) -> bool {
        tokio::time::timeout(self.settings.store_timeout, self.repository.health_check())
            .await
            .unwrap_or(false)
    }

    async fn lookup_cache(&self, code: &str) -> Option<String> {
        match within_cache_deadline(self.settings.cache_timeout, self.cache.get_url(code)).await {
            Ok(Some(url)) => {
                metrics::counter!("cache_hits_total").increment(1);
                debug!("Cache HIT for {}", code);
                Some(url)
            }
            Ok(None) => {
                metrics::counter!("cache_misses_total").increment(1);
                debug!("Cache MISS for {}", code);
                None
            }
            Err(e) => {
                metrics::counter!("cache_misses_total").increment(1);
                warn!("Cache read failed for {}, using database: {}", code, e);
                None
            }
        }
    }

    fn refill_cache(&self, code: &str, long_url: &str) {
        let cache = self.cache.clone();
        let code = code.to_string();
        let long_url = long_url.to_string();
        let ttl = self.settings.cache_ttl;
        let limit = self.settings.cache_timeout;

        tokio::spawn(async move {
            if let Err(e) =
                within_cache_deadline(limit, cache.set_url(&code, &long_url, Some(ttl))).await
            {
                warn!("Cache refill failed for {}: {}", code, e);
            }
        });
    }

    fn dispatch_click(&self, code: &str) -> ClickDispatch {
        match self.click_sender.try_send(ClickEvent::new(code)) {
            Ok(()) => ClickDispatch::Queued,
            Err(TrySendError::Full(_)) => {
                metrics::counter!("clicks_dropped_total").increment(1);
                warn!("Click queue full, dropping click for {}", code);
                ClickDispatch::Dropped
            }
            Err(TrySendError::Closed(_)) => {
                metrics::counter!("clicks_dropped_total").increment(1);
                warn!("Click queue closed, dropping click for {}", code);
                ClickDispatch::Dropped
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::UrlRecord;
    use crate::domain::repositories::MockUrlRepository;
    use crate::infrastructure::cache::{CacheError, MockCacheService};
    use chrono::Utc;
    use metrics::{
        Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
    };
    use serde_json::json;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn record(code: &str, url: &str) -> UrlRecord {
        UrlRecord::new(1, url.to_string(), Some(code.to_string()), 0, Utc::now())
    }

    fn resolver(
        repo: MockUrlRepository,
        cache: MockCacheService,
        settings: ServiceSettings,
    ) -> (Resolver<MockUrlRepository>, mpsc::Receiver<ClickEvent>) {
        let (tx, rx) = mpsc::channel(16);
        (
            Resolver::new(Arc::new(repo), Arc::new(cache), tx, settings),
            rx,
        )
    }

    #[tokio::test]
    async fn test_cache_hit_skips_store() {
        let mut repo = MockUrlRepository::new();
        let mut cache = MockCacheService::new();
        cache
            .expect_get_url()
            .withf(|code| code == "abc")
            .times(1)
            .returning(|_| Ok(Some("example.com".to_string())));
        repo.expect_find_by_code().times(0);

        let (resolver, mut rx) = resolver(repo, cache, ServiceSettings::default());
        let resolution = resolver.resolve("abc").await.unwrap().unwrap();

        assert_eq!(resolution.long_url, "https://example.com");
        assert_eq!(resolution.source, ResolutionSource::Cache);
        assert_eq!(resolution.click, ClickDispatch::Queued);
        assert_eq!(rx.try_recv().unwrap(), ClickEvent::new("abc"));
    }

    #[tokio::test]
    async fn test_cache_miss_falls_back_to_store() {
        let mut repo = MockUrlRepository::new();
        let mut cache = MockCacheService::new();
        cache.expect_get_url().returning(|_| Ok(None));
        cache.expect_set_url().times(0);
        repo.expect_find_by_code()
            .withf(|code| code == "abc")
            .times(1)
            .returning(|_| Ok(Some(record("abc", "http://example.com/x"))));

        let (resolver, mut rx) = resolver(repo, cache, ServiceSettings::default());
        let resolution = resolver.resolve("abc").await.unwrap().unwrap();

        assert_eq!(resolution.long_url, "http://example.com/x");
        assert_eq!(resolution.source, ResolutionSource::Store);
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_cache_error_falls_back_to_store() {
        let mut repo = MockUrlRepository::new();
        let mut cache = MockCacheService::new();
        cache
            .expect_get_url()
            .returning(|_| Err(CacheError::OperationError("broken pipe".to_string())));
        repo.expect_find_by_code()
            .times(1)
            .returning(|_| Ok(Some(record("abc", "example.com"))));

        let (resolver, _rx) = resolver(repo, cache, ServiceSettings::default());
        let resolution = resolver.resolve("abc").await.unwrap().unwrap();

        assert_eq!(resolution.long_url, "https://example.com");
        assert_eq!(resolution.source, ResolutionSource::Store);
    }

    #[tokio::test]
    async fn test_unknown_code_is_none_without_click() {
        let mut repo = MockUrlRepository::new();
        let mut cache = MockCacheService::new();
        cache.expect_get_url().returning(|_| Ok(None));
        repo.expect_find_by_code().times(1).returning(|_| Ok(None));

        let (resolver, mut rx) = resolver(repo, cache, ServiceSettings::default());

        assert!(resolver.resolve("zzz").await.unwrap().is_none());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_malformed_code_skips_cache_and_store() {
        let mut repo = MockUrlRepository::new();
        let mut cache = MockCacheService::new();
        cache.expect_get_url().times(0);
        repo.expect_find_by_code().times(0);

        let (resolver, mut rx) = resolver(repo, cache, ServiceSettings::default());

        assert!(resolver.resolve("doesNotExist123").await.unwrap().is_none());
        assert!(resolver.resolve("not-a-code").await.unwrap().is_none());
        assert!(resolver.resolve("").await.unwrap().is_none());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_store_error_is_not_masked_as_not_found() {
        let mut repo = MockUrlRepository::new();
        let mut cache = MockCacheService::new();
        cache.expect_get_url().returning(|_| Ok(None));
        repo.expect_find_by_code()
            .returning(|_| Err(AppError::storage("Database error", json!({}))));

        let (resolver, mut rx) = resolver(repo, cache, ServiceSettings::default());
        let result = resolver.resolve("abc").await;

        assert!(matches!(result, Err(AppError::Storage { .. })));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_full_click_queue_does_not_fail_resolution() {
        let repo = MockUrlRepository::new();
        let mut cache = MockCacheService::new();
        cache
            .expect_get_url()
            .returning(|_| Ok(Some("example.com".to_string())));

        let (tx, _rx) = mpsc::channel(1);
        let resolver = Resolver::new(
            Arc::new(repo),
            Arc::new(cache),
            tx,
            ServiceSettings::default(),
        );

        let first = resolver.resolve("abc").await.unwrap().unwrap();
        let second = resolver.resolve("abc").await.unwrap().unwrap();

        assert_eq!(first.click, ClickDispatch::Queued);
        assert_eq!(second.click, ClickDispatch::Dropped);
        assert_eq!(second.long_url, "https://example.com");
    }

    #[tokio::test]
    async fn test_closed_click_queue_does_not_fail_resolution() {
        let repo = MockUrlRepository::new();
        let mut cache = MockCacheService::new();
        cache
            .expect_get_url()
            .returning(|_| Ok(Some("https://example.com".to_string())));

        let (resolver, rx) = resolver(repo, cache, ServiceSettings::default());
        drop(rx);

        let resolution = resolver.resolve("abc").await.unwrap().unwrap();
        assert_eq!(resolution.click, ClickDispatch::Dropped);
    }

    #[tokio::test]
    async fn test_refill_on_miss_writes_cache_when_enabled() {
        let mut repo = MockUrlRepository::new();
        let mut cache = MockCacheService::new();
        let (done_tx, mut done_rx) = mpsc::channel(1);

        cache.expect_get_url().returning(|_| Ok(None));
        cache
            .expect_set_url()
            .withf(|code, url, _| code == "abc" && url == "example.com")
            .times(1)
            .returning(move |_, _, _| {
                let _ = done_tx.try_send(());
                Ok(())
            });
        repo.expect_find_by_code()
            .returning(|_| Ok(Some(record("abc", "example.com"))));

        let settings = ServiceSettings {
            refill_cache_on_miss: true,
            ..ServiceSettings::default()
        };
        let (resolver, _rx) = resolver(repo, cache, settings);

        resolver.resolve("abc").await.unwrap().unwrap();
        done_rx.recv().await.unwrap();
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let mut repo = MockUrlRepository::new();
        let mut cache = MockCacheService::new();
        let mut hits = 0;
        // first call misses the cache, second one hits
        cache.expect_get_url().times(2).returning(move |_| {
            hits += 1;
            if hits == 1 {
                Ok(None)
            } else {
                Ok(Some("example.com".to_string()))
            }
        });
        repo.expect_find_by_code()
            .times(1)
            .returning(|_| Ok(Some(record("abc", "example.com"))));

        let (resolver, _rx) = resolver(repo, cache, ServiceSettings::default());
        let first = resolver.resolve("abc").await.unwrap().unwrap();
        let second = resolver.resolve("abc").await.unwrap().unwrap();

        assert_eq!(first.long_url, second.long_url);
        assert_ne!(first.source, second.source);
    }

    /// Recorder that keeps counter values in memory.
    #[derive(Default)]
    struct CountingRecorder {
        counters: std::sync::Mutex<std::collections::HashMap<String, Arc<AtomicU64>>>,
    }

    impl CountingRecorder {
        fn value(&self, name: &str) -> u64 {
            self.counters
                .lock()
                .unwrap()
                .get(name)
                .map_or(0, |c| c.load(Ordering::SeqCst))
        }
    }

    impl Recorder for CountingRecorder {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
            let counter = self
                .counters
                .lock()
                .unwrap()
                .entry(key.name().to_string())
                .or_default()
                .clone();
            Counter::from_arc(counter)
        }

        fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
            Gauge::noop()
        }

        fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
            Histogram::noop()
        }
    }

    #[test]
    fn test_dropped_clicks_reach_installed_recorder() {
        let (tx, rx) = mpsc::channel(1);
        let resolver = Resolver::new(
            Arc::new(MockUrlRepository::new()),
            Arc::new(MockCacheService::new()),
            tx,
            ServiceSettings::default(),
        );
        let recorder = CountingRecorder::default();

        metrics::with_local_recorder(&recorder, || {
            assert_eq!(resolver.dispatch_click("abc"), ClickDispatch::Queued);
            assert_eq!(resolver.dispatch_click("abc"), ClickDispatch::Dropped);
            drop(rx);
            assert_eq!(resolver.dispatch_click("abc"), ClickDispatch::Dropped);
        });

        assert_eq!(recorder.value("clicks_dropped_total"), 2);
    }
}
