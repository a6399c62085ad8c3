#![allow(dead_code)]

use async_trait::async_trait;
use mini_link::application::services::{Registrar, Resolver, ServiceSettings};
use mini_link::domain::click_event::ClickEvent;
use mini_link::domain::repositories::UrlRepository;
use mini_link::infrastructure::cache::{CacheError, CacheResult, CacheService};
use mini_link::infrastructure::persistence::PgUrlRepository;
use mini_link::state::AppState;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

pub const BASE_URL: &str = "https://mini.link";

/// In-process cache with real TTL handling.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryCache {
    pub fn evict(&self, code: &str) {
        self.entries.lock().unwrap().remove(code);
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.lock().unwrap().contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(short_code) {
            Some((url, expires)) if *expires > Instant::now() => Ok(Some(url.clone())),
            Some(_) => {
                entries.remove(short_code);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_url(
        &self,
        short_code: &str,
        long_url: &str,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        let expires = Instant::now() + ttl.unwrap_or(Duration::from_secs(3600));
        self.entries
            .lock()
            .unwrap()
            .insert(short_code.to_string(), (long_url.to_string(), expires));
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

/// Cache whose backend is always down.
pub struct BrokenCache;

#[async_trait]
impl CacheService for BrokenCache {
    async fn get_url(&self, _short_code: &str) -> CacheResult<Option<String>> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn set_url(
        &self,
        _short_code: &str,
        _long_url: &str,
        _ttl: Option<Duration>,
    ) -> CacheResult<()> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn health_check(&self) -> bool {
        false
    }
}

pub struct Services {
    pub repository: Arc<dyn UrlRepository>,
    pub registrar: Arc<Registrar>,
    pub resolver: Arc<Resolver>,
}

pub fn create_services(
    pool: PgPool,
    cache: Arc<dyn CacheService>,
    settings: ServiceSettings,
) -> (Services, mpsc::Receiver<ClickEvent>) {
    let repository: Arc<dyn UrlRepository> = Arc::new(PgUrlRepository::new(Arc::new(pool)));
    let (tx, rx) = mpsc::channel(1000);

    let registrar = Arc::new(Registrar::new(repository.clone(), cache.clone(), settings));
    let resolver = Arc::new(Resolver::new(repository.clone(), cache, tx, settings));

    (
        Services {
            repository,
            registrar,
            resolver,
        },
        rx,
    )
}

pub fn create_test_state(
    pool: PgPool,
    cache: Arc<dyn CacheService>,
) -> (AppState, mpsc::Receiver<ClickEvent>) {
    let (services, rx) = create_services(pool, cache.clone(), ServiceSettings::default());
    let state = AppState::new(services.registrar, services.resolver, cache, BASE_URL);
    (state, rx)
}

pub async fn insert_url(pool: &PgPool, long_url: &str, code: &str) -> i64 {
    sqlx::query_scalar::<_, i64>("INSERT INTO urls (long_url, short_url) VALUES ($1, $2) RETURNING id")
        .bind(long_url)
        .bind(code)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn click_count(pool: &PgPool, code: &str) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT click_count FROM urls WHERE short_url = $1")
        .bind(code)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn total_clicks(pool: &PgPool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COALESCE(SUM(click_count), 0)::BIGINT FROM urls")
        .fetch_one(pool)
        .await
        .unwrap()
}
