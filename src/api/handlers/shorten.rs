//! Handler for link shortening endpoint.

use axum::{Json, extract::State};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short URL for a long URL.
///
/// # Endpoint
///
/// `POST /shorten`
///
/// # Request Body
///
/// ```json
/// { "long_url": "example.com/some/page" }
/// ```
///
/// # Response
///
/// ```json
/// { "short_url": "https://mini.link/2Bi", "code": "2Bi" }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if the URL is empty or malformed.
/// Returns 500 Internal Server Error if the database write fails.
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Result<Json<ShortenResponse>, AppError> {
    payload.validate()?;

    let registration = state.registrar.register(&payload.long_url).await?;

    Ok(Json(ShortenResponse {
        short_url: state.short_url(&registration.code),
        code: registration.code,
    }))
}
