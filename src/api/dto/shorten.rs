//! DTOs for link shortening endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to shorten a single URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The URL to shorten; the scheme may be omitted. Deeper checks happen
    /// in the registrar.
    #[validate(length(min = 1, message = "long_url must not be empty"))]
    pub long_url: String,
}

/// Response for a registered URL.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub short_url: String,
    pub code: String,
}
