//! Repository trait for short link storage.

use crate::domain::entities::UrlRecord;
use crate::error::AppError;
use async_trait::async_trait;

/// Durable store for URL records.
///
/// Ids are generated by the store on insert; callers never compute them.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Inserts a record for `long_url` and returns its generated id.
    ///
    /// The record has no short code until [`Self::assign_code`] is called.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors.
    async fn insert(&self, long_url: &str) -> Result<i64, AppError>;

    /// Writes the short code onto the record identified by `id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record has this id.
    /// Returns [`AppError::Storage`] on database errors, including a
    /// violation of the unique constraint on codes.
    async fn assign_code(&self, id: i64, code: &str) -> Result<(), AppError>;

    /// Finds a record by its short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors. A missing code is
    /// `Ok(None)`, never an error.
    async fn find_by_code(&self, code: &str) -> Result<Option<UrlRecord>, AppError>;

    /// Adds one to the click counter of the record with this code.
    ///
    /// Returns `Ok(false)` when no record matched.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors.
    async fn increment_clicks(&self, code: &str) -> Result<bool, AppError>;

    /// Checks that the store answers queries.
    async fn health_check(&self) -> bool;
}
