//! Input checks for URLs submitted for shortening.
//!
//! The stored value is the trimmed input exactly as submitted (the scheme may
//! be missing); the scheme is only filled in when a code is resolved.

use url::Url;

use super::scheme::ensure_scheme;

/// Longest URL accepted for shortening, in bytes.
pub const MAX_URL_LENGTH: usize = 2048;

/// Reasons a submitted URL is rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("URL must not be empty")]
    Empty,

    #[error("URL is too long ({0} bytes, max {MAX_URL_LENGTH})")]
    TooLong(usize),

    #[error("URL must not contain whitespace or control characters")]
    IllegalCharacters,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("URL has no host")]
    MissingHost,
}

/// Validates a long URL and returns the trimmed value to store.
///
/// The URL is checked as it will be served, after [`ensure_scheme`], so
/// `example.com` is accepted as `https://example.com`.
///
/// # Errors
///
/// See [`UrlValidationError`] for the individual rules.
pub fn validate_long_url(input: &str) -> Result<String, UrlValidationError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlValidationError::Empty);
    }

    if trimmed.len() > MAX_URL_LENGTH {
        return Err(UrlValidationError::TooLong(trimmed.len()));
    }

    if trimmed
        .chars()
        .any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(UrlValidationError::IllegalCharacters);
    }

    let parsed = Url::parse(&ensure_scheme(trimmed))
        .map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(trimmed.to_string())
}
