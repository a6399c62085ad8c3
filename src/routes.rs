//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST /shorten`  - Register a long URL
//! - `GET  /health`   - Health check: DB, cache, click queue
//! - `GET  /{code}`   - Short link redirect
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **CORS** - Browser access for the configured origins
//! - **Path normalization** - Trailing slash handling

use crate::api::handlers::{health_handler, redirect_handler, shorten_handler};
use crate::api::middleware::{cors, tracing};
use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `allowed_origins` - CORS origins; empty allows any origin
pub fn app_router(state: AppState, allowed_origins: &[String]) -> NormalizePath<Router> {
    // static segments win over the `{code}` capture
    let router = Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/health", get(health_handler))
        .route("/{code}", get(redirect_handler))
        .with_state(state)
        .layer(cors::layer(allowed_origins))
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
