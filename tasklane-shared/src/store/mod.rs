/// Storage abstraction
///
/// Handlers talk to a [`Store`] instead of a concrete pool so the same router
/// runs against PostgreSQL in production and against an in-memory store in
/// tests and local demos.
///
/// # Backends
///
/// - [`postgres::PgStore`]: delegates to the queries in [`crate::models`]
/// - [`memory::MemoryStore`]: process-local maps behind a `tokio` lock
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tasklane_shared::models::user::CreateUser;
/// use tasklane_shared::store::{memory::MemoryStore, Store};
///
/// # async fn example() -> Result<(), tasklane_shared::store::StoreError> {
/// let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
///
/// let user = store
///     .create_user(CreateUser {
///         name: "Ada".to_string(),
///         email: "ada@example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///     })
///     .await?;
///
/// assert!(store.find_user(user.id).await?.is_some());
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{
    file::{CreateFile, File},
    invite::{Invite, NewInvite},
    project::{NewProject, Project},
    task::{NewTask, Task},
    user::{CreateUser, User},
};

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint was violated
    #[error("Duplicate value violates {0}")]
    Duplicate(String),

    /// A foreign key points at a missing row
    #[error("Referenced row does not exist: {0}")]
    MissingReference(String),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            let constraint = db.constraint().unwrap_or("constraint").to_string();
            if db.is_unique_violation() {
                return StoreError::Duplicate(constraint);
            }
            if db.is_foreign_key_violation() {
                return StoreError::MissingReference(constraint);
            }
        }
        StoreError::Database(err)
    }
}

/// Result alias for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations used by the API
#[async_trait]
pub trait Store: Send + Sync {
    /// Verifies the backend is reachable
    async fn ping(&self) -> StoreResult<()>;

    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>>;

    /// Case-insensitive lookup
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Stores a new hash and token cut-off; false if the user is missing
    async fn update_password(
        &self,
        user_id: i64,
        password_hash: &str,
        allow_datetime: DateTime<Utc>,
    ) -> StoreResult<bool>;

    async fn create_file(&self, data: CreateFile) -> StoreResult<File>;

    async fn find_file(&self, id: i64) -> StoreResult<Option<File>>;

    async fn set_avatar(&self, user_id: i64, file_id: i64) -> StoreResult<bool>;

    /// Non-deleted projects the user owns or collaborates on, newest first
    async fn list_visible_projects(&self, user_id: i64) -> StoreResult<Vec<Project>>;

    async fn find_project(&self, id: i64) -> StoreResult<Option<Project>>;

    async fn create_project(&self, data: NewProject) -> StoreResult<Project>;

    /// Writes name, sharing and deletion flags; `tasks_order` is left as stored
    async fn save_project(&self, project: &Project) -> StoreResult<Project>;

    /// Replaces the project's `tasks_order`; `None` if the project is missing
    async fn set_tasks_order(
        &self,
        project_id: i64,
        tasks_order: &[i64],
    ) -> StoreResult<Option<Project>>;

    async fn is_collaborator(&self, project_id: i64, user_id: i64) -> StoreResult<bool>;

    /// Adds the association; an existing one is left untouched
    async fn add_collaborator(&self, project_id: i64, user_id: i64) -> StoreResult<()>;

    /// Returns true if an association was removed
    async fn remove_collaborator(&self, project_id: i64, user_id: i64) -> StoreResult<bool>;

    async fn create_invite(&self, data: NewInvite) -> StoreResult<Invite>;

    async fn find_invite_by_code(&self, code: &str) -> StoreResult<Option<Invite>>;

    async fn mark_invite_sent(&self, id: i64) -> StoreResult<Option<Invite>>;

    /// Consumes the invite, adding `user_id` as collaborator when asked to
    async fn accept_invite(
        &self,
        invite_id: i64,
        project_id: i64,
        user_id: i64,
        add_collaborator: bool,
    ) -> StoreResult<()>;

    /// Non-deleted tasks of a project, oldest first
    async fn list_tasks(&self, project_id: i64) -> StoreResult<Vec<Task>>;

    async fn find_task(&self, id: i64) -> StoreResult<Option<Task>>;

    /// Inserts the task and appends its id to the project's `tasks_order`
    async fn create_task(&self, data: NewTask) -> StoreResult<Task>;

    async fn save_task(&self, task: &Task) -> StoreResult<Task>;

    /// Soft-deletes the task and removes its id from the project's `tasks_order`
    async fn delete_task(&self, task: &Task) -> StoreResult<()>;
}
