//! Tunables shared by the registrar and the resolver.

use std::future::Future;
use std::time::Duration;

use serde_json::json;

use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheError, CacheResult};

/// Cache policy and per-call deadlines for store and cache I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceSettings {
    /// Lifetime of an entry written to the resolution cache.
    pub cache_ttl: Duration,
    pub cache_timeout: Duration,
    pub store_timeout: Duration,
    /// Write the mapping back to the cache after a store fallback.
    pub refill_cache_on_miss: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(3600),
            cache_timeout: Duration::from_millis(500),
            store_timeout: Duration::from_secs(5),
            refill_cache_on_miss: false,
        }
    }
}

impl From<&Config> for ServiceSettings {
    fn from(config: &Config) -> Self {
        Self {
            cache_ttl: Duration::from_secs(config.cache_ttl_seconds),
            cache_timeout: Duration::from_millis(config.cache_timeout_ms),
            store_timeout: Duration::from_millis(config.store_timeout_ms),
            refill_cache_on_miss: config.cache_refill_on_miss,
        }
    }
}

/// Runs a store call under `limit`; running out of time is a storage failure.
pub(crate) async fn within_store_deadline<T, F>(limit: Duration, call: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    tokio::time::timeout(limit, call).await.unwrap_or_else(|_| {
        Err(AppError::storage(
            "Database call timed out",
            json!({ "timeout_ms": limit.as_millis() as u64 }),
        ))
    })
}

/// Runs a cache call under `limit`.
pub(crate) async fn within_cache_deadline<T, F>(limit: Duration, call: F) -> CacheResult<T>
where
    F: Future<Output = CacheResult<T>>,
{
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(CacheError::Timeout(limit)))
}
