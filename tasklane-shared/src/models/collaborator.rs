/// Collaborator association (project ↔ non-owner user)
///
/// ```sql
/// CREATE TABLE collaborators (
///     project_id BIGINT NOT NULL REFERENCES projects(id),
///     user_id BIGINT NOT NULL REFERENCES users(id),
///     PRIMARY KEY (project_id, user_id)
/// );
/// ```
///
/// Removing a row never touches the user it points at.

use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::FromRow)]
pub struct Collaborator {
    pub project_id: i64,
    pub user_id: i64,
}

impl Collaborator {
    /// Adds a collaborator; an existing row is left as is
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        project_id: i64,
        user_id: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO collaborators (project_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (project_id, user_id) DO NOTHING
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn find(
        pool: &PgPool,
        project_id: i64,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Collaborator>(
            "SELECT project_id, user_id FROM collaborators WHERE project_id = $1 AND user_id = $2",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Removes the association, returning true if a row was deleted
    pub async fn delete(pool: &PgPool, project_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM collaborators WHERE project_id = $1 AND user_id = $2")
                .bind(project_id)
                .bind(user_id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
