//! Cross-origin request policy for browser clients.

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Creates the CORS layer.
///
/// Allows `GET`, `POST` and `OPTIONS` with a `Content-Type` header. An empty
/// `allowed_origins` list allows any origin; otherwise only the listed
/// origins are echoed back. Entries that are not valid header values are
/// skipped with a warning.
///
/// Preflight `OPTIONS` requests are answered by the layer itself.
pub fn layer(allowed_origins: &[String]) -> CorsLayer {
    let origin = if allowed_origins.is_empty() {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    ::tracing::warn!("Ignoring invalid CORS origin {:?}", o);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
