//! Shared application state injected into all handlers.

use std::sync::Arc;

use crate::application::services::{Registrar, Resolver};
use crate::infrastructure::cache::CacheService;

/// Handles built once at startup and cloned into every request.
#[derive(Clone)]
pub struct AppState {
    pub registrar: Arc<Registrar>,
    pub resolver: Arc<Resolver>,
    pub cache: Arc<dyn CacheService>,
    /// Prefix of returned short URLs, without trailing slash.
    pub public_base_url: String,
}

impl AppState {
    pub fn new(
        registrar: Arc<Registrar>,
        resolver: Arc<Resolver>,
        cache: Arc<dyn CacheService>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            registrar,
            resolver,
            cache,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Builds the public short URL for `code`.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.public_base_url, code)
    }
}
