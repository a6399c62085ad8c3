//! Registration of long URLs under store-derived short codes.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use super::settings::{ServiceSettings, within_cache_deadline, within_store_deadline};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::base62;
use crate::utils::url_validator::validate_long_url;

/// Outcome of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub id: i64,
    pub code: String,
    /// Whether the cache was warmed. Advisory only; a cold entry still
    /// resolves through the store.
    pub cached: bool,
}

/// Assigns short codes to long URLs.
///
/// The store allocates a unique id, the code is the base-62 form of that id,
/// and the code is written back onto the same row. The insert and the code
/// write are separate statements: a failure in between leaves a row without
/// a code, which can never be resolved and never collides with another row.
pub struct Registrar<R: ?Sized = dyn UrlRepository> {
    repository: Arc<R>,
    cache: Arc<dyn CacheService>,
    settings: ServiceSettings,
}

impl<R: UrlRepository + ?Sized> Registrar<R> {
    /// Creates a new registrar.
    pub fn new(repository: Arc<R>, cache: Arc<dyn CacheService>, settings: ServiceSettings) -> Self {
        Self {
            repository,
            cache,
            settings,
        }
    }

    /// Registers `long_url` and returns its short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an empty or malformed URL; the
    /// store is not touched in that case.
    /// Returns [`AppError::Storage`] if the insert or the code write fails or
    /// times out.
    pub async fn register(&self, long_url: &str) -> Result<Registration, AppError> {
        let long_url = validate_long_url(long_url)?;

        let id = within_store_deadline(
            self.settings.store_timeout,
            self.repository.insert(&long_url),
        )
        .await?;

        let code = base62::encode(u64::try_from(id).map_err(|_| {
            AppError::internal("Store returned a negative id", json!({ "id": id }))
        })?);

        if let Err(e) = within_store_deadline(
            self.settings.store_timeout,
            self.repository.assign_code(id, &code),
        )
        .await
        {
            warn!("Record {} left without a code: {}", id, e);
            return Err(e);
        }

        let cached = self.warm_cache(&code, &long_url).await;
        info!("Registered {} as {}", long_url, code);

        Ok(Registration { id, code, cached })
    }

    /// Best-effort cache write; failures are logged and dropped.
    async fn warm_cache(&self, code: &str, long_url: &str) -> bool {
        let write = self
            .cache
            .set_url(code, long_url, Some(self.settings.cache_ttl));

        match within_cache_deadline(self.settings.cache_timeout, write).await {
            Ok(()) => {
                debug!("Cache warmed for {}", code);
                true
            }
            Err(e) => {
                warn!("Cache write failed for {}: {}", code, e);
                false
            }
        }
    }
}
