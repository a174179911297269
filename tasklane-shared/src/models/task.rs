/// Task model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     creator_id BIGINT NOT NULL REFERENCES users(id),
///     project_id BIGINT NOT NULL REFERENCES projects(id),
///     body VARCHAR(80) NOT NULL,
///     note TEXT,
///     notification_date TIMESTAMPTZ,
///     is_completed BOOLEAN NOT NULL DEFAULT FALSE,
///     completion_date TIMESTAMPTZ,
///     completed_by_user_id BIGINT REFERENCES users(id),
///     assigned_to_user_id BIGINT REFERENCES users(id),
///     is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Creating a task appends its id to the parent project's `tasks_order` in
/// the same transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;

use crate::merge::{parse, MergeError, MergeFields};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: i64,
    pub creator_id: i64,
    pub project_id: i64,
    pub body: String,
    pub note: Option<String>,
    pub notification_date: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub completion_date: Option<DateTime<Utc>>,
    pub completed_by_user_id: Option<i64>,
    pub assigned_to_user_id: Option<i64>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub creator_id: i64,
    pub project_id: i64,
    pub body: String,
    pub note: Option<String>,
    pub notification_date: Option<DateTime<Utc>>,
    pub assigned_to_user_id: Option<i64>,
}

impl NewTask {
    pub fn draft(creator_id: i64, project_id: i64) -> Self {
        Self {
            creator_id,
            project_id,
            body: String::new(),
            note: None,
            notification_date: None,
            assigned_to_user_id: None,
        }
    }
}

impl MergeFields for NewTask {
    const FIELDS: &'static [&'static str] =
        &["body", "note", "notification_date", "assigned_to_user_id"];

    fn assign(&mut self, field: &str, value: Value) -> Result<(), MergeError> {
        match field {
            "body" => self.body = parse(field, value)?,
            "note" => self.note = parse(field, value)?,
            "notification_date" => self.notification_date = parse(field, value)?,
            "assigned_to_user_id" => self.assigned_to_user_id = parse(field, value)?,
            _ => return Err(MergeError::UnknownField(field.to_string())),
        }
        Ok(())
    }
}

impl MergeFields for Task {
    const FIELDS: &'static [&'static str] = &[
        "body",
        "note",
        "notification_date",
        "is_completed",
        "assigned_to_user_id",
    ];

    fn assign(&mut self, field: &str, value: Value) -> Result<(), MergeError> {
        match field {
            "body" => self.body = parse(field, value)?,
            "note" => self.note = parse(field, value)?,
            "notification_date" => self.notification_date = parse(field, value)?,
            "is_completed" => self.is_completed = parse(field, value)?,
            "assigned_to_user_id" => self.assigned_to_user_id = parse(field, value)?,
            _ => return Err(MergeError::UnknownField(field.to_string())),
        }
        Ok(())
    }
}

impl Task {
    /// Brings the completion fields in line with `is_completed`
    ///
    /// An already completed task keeps its original completion record.
    pub fn sync_completion(&mut self, user_id: i64, now: DateTime<Utc>) {
        if self.is_completed {
            if self.completion_date.is_none() {
                self.completion_date = Some(now);
                self.completed_by_user_id = Some(user_id);
            }
        } else {
            self.completion_date = None;
            self.completed_by_user_id = None;
        }
    }

    pub async fn create(pool: &PgPool, data: NewTask) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (creator_id, project_id, body, note, notification_date,
                               assigned_to_user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, creator_id, project_id, body, note, notification_date, is_completed,
                      completion_date, completed_by_user_id, assigned_to_user_id, is_deleted,
                      created_at
            "#,
        )
        .bind(data.creator_id)
        .bind(data.project_id)
        .bind(data.body)
        .bind(data.note)
        .bind(data.notification_date)
        .bind(data.assigned_to_user_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE projects SET tasks_order = array_append(tasks_order, $2) WHERE id = $1")
            .bind(task.project_id)
            .bind(task.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(task)
    }

    /// Soft-deletes the task and drops it from the project's `tasks_order`
    pub async fn soft_delete(pool: &PgPool, task: &Task) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("UPDATE tasks SET is_deleted = TRUE WHERE id = $1")
            .bind(task.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE projects SET tasks_order = array_remove(tasks_order, $2) WHERE id = $1")
            .bind(task.project_id)
            .bind(task.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, creator_id, project_id, body, note, notification_date, is_completed,
                   completion_date, completed_by_user_id, assigned_to_user_id, is_deleted,
                   created_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists the project's non-deleted tasks, oldest first
    pub async fn list_by_project(pool: &PgPool, project_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, creator_id, project_id, body, note, notification_date, is_completed,
                   completion_date, completed_by_user_id, assigned_to_user_id, is_deleted,
                   created_at
            FROM tasks
            WHERE project_id = $1 AND is_deleted = FALSE
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    pub async fn save(pool: &PgPool, task: &Task) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET body = $2, note = $3, notification_date = $4, is_completed = $5,
                completion_date = $6, completed_by_user_id = $7, assigned_to_user_id = $8,
                is_deleted = $9
            WHERE id = $1
            RETURNING id, creator_id, project_id, body, note, notification_date, is_completed,
                      completion_date, completed_by_user_id, assigned_to_user_id, is_deleted,
                      created_at
            "#,
        )
        .bind(task.id)
        .bind(&task.body)
        .bind(&task.note)
        .bind(task.notification_date)
        .bind(task.is_completed)
        .bind(task.completion_date)
        .bind(task.completed_by_user_id)
        .bind(task.assigned_to_user_id)
        .bind(task.is_deleted)
        .fetch_one(pool)
        .await
    }
}
