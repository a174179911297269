/// Project invites
///
/// An invite carries a random code that the invitee redeems to become a
/// collaborator. Redeeming deletes the invite in the same transaction that
/// adds the collaborator row.
///
/// ```sql
/// CREATE TABLE invites (
///     id BIGSERIAL PRIMARY KEY,
///     invite_type VARCHAR(16),
///     project_id BIGINT REFERENCES projects(id),
///     email VARCHAR(80) NOT NULL,
///     invite_link VARCHAR(250),
///     code VARCHAR(80) UNIQUE,
///     is_sent BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::collaborator::Collaborator;

/// Invite delivered by email
pub const EMAIL_INVITE: &str = "email";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Invite {
    pub id: i64,
    pub invite_type: Option<String>,
    pub project_id: Option<i64>,
    pub email: String,
    pub invite_link: Option<String>,
    pub code: Option<String>,

    /// Set once the invite email was handed to the mailer
    pub is_sent: bool,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInvite {
    pub invite_type: String,
    pub project_id: i64,
    pub email: String,
    pub invite_link: String,
    pub code: String,
}

impl Invite {
    pub async fn create(pool: &PgPool, data: NewInvite) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Invite>(
            r#"
            INSERT INTO invites (invite_type, project_id, email, invite_link, code)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, invite_type, project_id, email, invite_link, code, is_sent, created_at
            "#,
        )
        .bind(data.invite_type)
        .bind(data.project_id)
        .bind(data.email)
        .bind(data.invite_link)
        .bind(data.code)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Invite>(
            r#"
            SELECT id, invite_type, project_id, email, invite_link, code, is_sent, created_at
            FROM invites
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(pool)
        .await
    }

    pub async fn mark_sent(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Invite>(
            r#"
            UPDATE invites SET is_sent = TRUE
            WHERE id = $1
            RETURNING id, invite_type, project_id, email, invite_link, code, is_sent, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Redeems the invite for `user_id`
    ///
    /// When `add_collaborator` is false (the user already participates) the
    /// invite is only consumed.
    pub async fn accept(
        pool: &PgPool,
        invite_id: i64,
        project_id: i64,
        user_id: i64,
        add_collaborator: bool,
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        if add_collaborator {
            Collaborator::create(&mut tx, project_id, user_id).await?;
        }

        sqlx::query("DELETE FROM invites WHERE id = $1")
            .bind(invite_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await
    }
}
