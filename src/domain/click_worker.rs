//! Background worker that applies click counter increments.
//!
//! Counter failures are logged and dropped here; they never reach the
//! request that produced the click.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error, info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

/// Attempts per click, including the first one.
const MAX_ATTEMPTS: usize = 3;

/// Drains `rx` and increments the click counter for each event.
///
/// At most `concurrency` updates run at once and each attempt is cut off
/// after `store_timeout`. Only failures that prove the UPDATE never ran are
/// retried, so a click is counted at most once. Returns once every sender
/// is dropped and all in-flight updates have finished.
pub async fn run_click_worker<R>(
    mut rx: mpsc::Receiver<ClickEvent>,
    repository: Arc<R>,
    concurrency: usize,
    store_timeout: Duration,
) where
    R: UrlRepository + ?Sized + 'static,
{
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut in_flight = JoinSet::new();

    while let Some(event) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let repository = repository.clone();

        in_flight.spawn(async move {
            record_click(repository.as_ref(), &event.code, store_timeout).await;
            drop(permit);
        });

        // reap finished tasks so the set does not grow without bound
        while in_flight.try_join_next().is_some() {}
    }

    while in_flight.join_next().await.is_some() {}
    info!("Click worker stopped");
}

async fn record_click<R>(repository: &R, code: &str, store_timeout: Duration)
where
    R: UrlRepository + ?Sized,
{
    let strategy = ExponentialBackoff::from_millis(2)
        .factor(25)
        .max_delay(Duration::from_secs(1))
        .map(jitter)
        .take(MAX_ATTEMPTS - 1);

    let attempt = move || async move {
        match tokio::time::timeout(store_timeout, repository.increment_clicks(code)).await {
            Ok(result) => result,
            // the UPDATE may still commit, so this is not retried
            Err(_) => Err(AppError::storage(
                "Click update timed out",
                json!({ "timeout_ms": store_timeout.as_millis() as u64 }),
            )),
        }
    };

    let retryable = |e: &AppError| {
        if e.is_retryable() {
            warn!("Retrying click update for {}: {}", code, e);
        }
        e.is_retryable()
    };

    match RetryIf::spawn(strategy, attempt, retryable).await {
        Ok(true) => {
            metrics::counter!("clicks_recorded_total").increment(1);
        }
        Ok(false) => {
            debug!("Click for {} matched no record", code);
        }
        Err(e) => {
            metrics::counter!("clicks_failed_total").increment(1);
            error!("Failed to update click count for {}: {}", code, e);
        }
    }
}
