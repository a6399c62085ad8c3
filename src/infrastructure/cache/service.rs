//! Cache service trait and error types.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// Errors that can occur during cache operations.
///
/// Never surfaced to API callers: services log them and fall back to the
/// durable store.
#[derive(Debug)]
pub enum CacheError {
    ConnectionError(String),
    OperationError(String),
    Timeout(Duration),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Cache connection error: {}", e),
            Self::OperationError(e) => write!(f, "Cache operation error: {}", e),
            Self::Timeout(d) => write!(f, "Cache call timed out after {}ms", d.as_millis()),
        }
    }
}

impl std::error::Error for CacheError {}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for caching short code to long URL mappings.
///
/// The cache is advisory. A miss, an expired entry, or an error all mean
/// "ask the durable store".
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the long URL cached for a short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(url))` on cache hit
    /// - `Ok(None)` on cache miss or expiry
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend cannot be queried.
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>>;

    /// Stores a mapping that expires after `ttl`.
    ///
    /// `None` uses the implementation's default TTL.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the write fails.
    async fn set_url(
        &self,
        short_code: &str,
        long_url: &str,
        ttl: Option<Duration>,
    ) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    ///
    /// Used by the health endpoint to report cache status.
    async fn health_check(&self) -> bool;
}
