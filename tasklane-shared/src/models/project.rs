/// Project model and database operations
///
/// A project has exactly one owner. Other participants are rows in the
/// `collaborators` join table. Deletion is soft: `is_deleted` is flipped and
/// the row stays in storage, hidden from listings.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id BIGSERIAL PRIMARY KEY,
///     owner_id BIGINT NOT NULL REFERENCES users(id),
///     name VARCHAR(80) NOT NULL,
///     tasks_order BIGINT[] NOT NULL DEFAULT '{}',
///     is_shared BOOLEAN NOT NULL DEFAULT FALSE,
///     is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;

use crate::merge::{parse, MergeError, MergeFields};

/// Project row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: i64,

    /// The single user with full control
    pub owner_id: i64,

    pub name: String,

    /// Task ids in display order
    pub tasks_order: Vec<i64>,

    pub is_shared: bool,

    /// Soft delete flag
    pub is_deleted: bool,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    pub owner_id: i64,
    pub name: String,
    pub tasks_order: Vec<i64>,
    pub is_shared: bool,
}

impl NewProject {
    /// Empty draft owned by `owner_id`, filled in by a merge
    pub fn owned_by(owner_id: i64) -> Self {
        Self {
            owner_id,
            name: String::new(),
            tasks_order: Vec::new(),
            is_shared: false,
        }
    }
}

impl MergeFields for NewProject {
    const FIELDS: &'static [&'static str] = &["name", "tasks_order", "is_shared"];

    fn assign(&mut self, field: &str, value: Value) -> Result<(), MergeError> {
        match field {
            "name" => self.name = parse(field, value)?,
            "tasks_order" => self.tasks_order = parse(field, value)?,
            "is_shared" => self.is_shared = parse(field, value)?,
            _ => return Err(MergeError::UnknownField(field.to_string())),
        }
        Ok(())
    }
}

impl MergeFields for Project {
    const FIELDS: &'static [&'static str] = &["name", "tasks_order", "is_shared", "is_deleted"];

    fn assign(&mut self, field: &str, value: Value) -> Result<(), MergeError> {
        match field {
            "name" => self.name = parse(field, value)?,
            "tasks_order" => self.tasks_order = parse(field, value)?,
            "is_shared" => self.is_shared = parse(field, value)?,
            "is_deleted" => self.is_deleted = parse(field, value)?,
            _ => return Err(MergeError::UnknownField(field.to_string())),
        }
        Ok(())
    }
}

impl Project {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner_id == user_id
    }

    pub async fn create(pool: &PgPool, data: NewProject) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (owner_id, name, tasks_order, is_shared)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, name, tasks_order, is_shared, is_deleted, created_at
            "#,
        )
        .bind(data.owner_id)
        .bind(data.name)
        .bind(data.tasks_order)
        .bind(data.is_shared)
        .fetch_one(pool)
        .await
    }

    /// Finds a project by ID, including soft-deleted ones
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT id, owner_id, name, tasks_order, is_shared, is_deleted, created_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists non-deleted projects the user owns or collaborates on, newest first
    pub async fn list_visible(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT id, owner_id, name, tasks_order, is_shared, is_deleted, created_at
            FROM projects
            WHERE is_deleted = FALSE
              AND (
                owner_id = $1
                OR id IN (SELECT project_id FROM collaborators WHERE user_id = $1)
              )
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Writes the mutable columns back
    ///
    /// `owner_id` and `created_at` are never changed here. Neither is
    /// `tasks_order`, which task creation and deletion maintain in place;
    /// see [`Project::set_tasks_order`].
    pub async fn save(pool: &PgPool, project: &Project) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET name = $2, is_shared = $3, is_deleted = $4
            WHERE id = $1
            RETURNING id, owner_id, name, tasks_order, is_shared, is_deleted, created_at
            "#,
        )
        .bind(project.id)
        .bind(&project.name)
        .bind(project.is_shared)
        .bind(project.is_deleted)
        .fetch_one(pool)
        .await
    }

    /// Replaces the task ordering
    pub async fn set_tasks_order(
        pool: &PgPool,
        id: i64,
        tasks_order: &[i64],
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET tasks_order = $2
            WHERE id = $1
            RETURNING id, owner_id, name, tasks_order, is_shared, is_deleted, created_at
            "#,
        )
        .bind(id)
        .bind(tasks_order)
        .fetch_optional(pool)
        .await
    }
}
