/// User model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(80) NOT NULL,
///     email VARCHAR(80) NOT NULL,
///     password_hash VARCHAR(128) NOT NULL,
///     role VARCHAR(80),
///     allow_datetime TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     active BOOLEAN NOT NULL DEFAULT TRUE,
///     avatar_id BIGINT REFERENCES files(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE UNIQUE INDEX users_email_lower_key ON users (LOWER(email));
/// ```
///
/// `allow_datetime` is the earliest issue time a token may carry for this
/// user; bumping it (on password reset) invalidates every older token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Role assigned to newly registered users
pub const DEFAULT_ROLE: &str = "user";

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,

    pub name: String,

    /// Unique across all users
    pub email: String,

    /// Argon2id PHC string, never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub role: Option<String>,

    /// Tokens issued before this instant are rejected
    pub allow_datetime: DateTime<Utc>,

    /// Inactive users cannot authenticate
    pub active: bool,

    /// Avatar file
    pub avatar_id: Option<i64>,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub name: String,

    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,
}

impl User {
    /// Whether a token issued at `iat` (Unix seconds) is acceptable for this user
    pub fn accepts_token_issued_at(&self, iat: i64) -> bool {
        self.active && iat >= self.allow_datetime.timestamp()
    }

    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns an error if the email already exists or the database fails
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, role, allow_datetime, active,
                      avatar_id, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(DEFAULT_ROLE)
        .fetch_one(pool)
        .await
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, allow_datetime, active,
                   avatar_id, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a user by email address (case-insensitive)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, allow_datetime, active,
                   avatar_id, created_at
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Replaces the password hash and moves `allow_datetime` forward
    ///
    /// Returns true if the user existed.
    pub async fn update_password(
        pool: &PgPool,
        id: i64,
        password_hash: &str,
        allow_datetime: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, allow_datetime = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .bind(allow_datetime)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Points the user's avatar at a stored file
    pub async fn set_avatar(pool: &PgPool, id: i64, file_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET avatar_id = $2 WHERE id = $1")
            .bind(id)
            .bind(file_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
