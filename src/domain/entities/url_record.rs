//! Stored short link record.

use chrono::{DateTime, Utc};

/// A row of the `urls` table.
///
/// `short_code` is `None` only between the insert that allocates `id` and the
/// follow-up write of the derived code. A record whose code was never written
/// cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UrlRecord {
    pub id: i64,
    pub long_url: String,
    #[sqlx(rename = "short_url")]
    pub short_code: Option<String>,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
}

impl UrlRecord {
    /// Creates a new UrlRecord instance.
    pub fn new(
        id: i64,
        long_url: String,
        short_code: Option<String>,
        click_count: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            long_url,
            short_code,
            click_count,
            created_at,
        }
    }
}
