/// Stored file metadata (user avatars)
///
/// ```sql
/// CREATE TABLE files (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(250),
///     key VARCHAR(250),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct File {
    pub id: i64,

    /// Original file name
    pub name: Option<String>,

    /// Object storage key
    pub key: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Input for recording a stored file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    pub name: Option<String>,
    pub key: Option<String>,
}

impl File {
    pub async fn create(pool: &PgPool, data: CreateFile) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, File>(
            "INSERT INTO files (name, key) VALUES ($1, $2) RETURNING id, name, key, created_at",
        )
        .bind(data.name)
        .bind(data.key)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, File>("SELECT id, name, key, created_at FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
