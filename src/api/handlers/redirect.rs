//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::Redirect,
};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Look the code up in the cache
/// 2. On a miss or cache error, query the database
/// 3. Queue a click for the background worker (dropped if the queue is full)
/// 4. Return 308 Permanent Redirect to the URL, with `https://` added when
///    the stored URL has no scheme
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
/// Returns 500 Internal Server Error if the database lookup fails.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    let resolution = state
        .resolver
        .resolve(&code)
        .await?
        .ok_or_else(|| AppError::not_found("URL not found", json!({ "code": code })))?;

    Ok(Redirect::permanent(&resolution.long_url))
}
