//! PostgreSQL implementation of the URL repository.

use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::UrlRecord;
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

/// PostgreSQL repository for URL records.
///
/// Ids come from the `urls.id` BIGSERIAL sequence, so concurrent inserts
/// never receive the same id.
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
}

impl PgUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn insert(&self, long_url: &str) -> Result<i64, AppError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO urls (long_url) VALUES ($1) RETURNING id",
        )
        .bind(long_url)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(id)
    }

    async fn assign_code(&self, id: i64, code: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE urls SET short_url = $1 WHERE id = $2")
            .bind(code)
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(
                "URL record not found",
                json!({ "id": id }),
            ));
        }

        Ok(())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<UrlRecord>, AppError> {
        let record = sqlx::query_as::<_, UrlRecord>(
            r#"
            SELECT id, long_url, short_url, click_count, created_at
            FROM urls
            WHERE short_url = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    async fn increment_clicks(&self, code: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE urls SET click_count = click_count + 1 WHERE short_url = $1")
            .bind(code)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> bool {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(self.pool.as_ref())
            .await
            .is_ok()
    }
}
