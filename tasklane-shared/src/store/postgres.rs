/// PostgreSQL-backed [`Store`]
///
/// A thin adapter: every method forwards to the model query of the same
/// name and converts `sqlx::Error` into [`StoreError`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{Store, StoreResult};
use crate::db::pool::health_check;
use crate::models::{
    collaborator::Collaborator,
    file::{CreateFile, File},
    invite::{Invite, NewInvite},
    project::{NewProject, Project},
    task::{NewTask, Task},
    user::{CreateUser, User},
};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn update_password(
        &self,
        user_id: i64,
        password_hash: &str,
        allow_datetime: DateTime<Utc>,
    ) -> StoreResult<bool> {
        Ok(User::update_password(&self.pool, user_id, password_hash, allow_datetime).await?)
    }

    async fn create_file(&self, data: CreateFile) -> StoreResult<File> {
        Ok(File::create(&self.pool, data).await?)
    }

    async fn find_file(&self, id: i64) -> StoreResult<Option<File>> {
        Ok(File::find_by_id(&self.pool, id).await?)
    }

    async fn set_avatar(&self, user_id: i64, file_id: i64) -> StoreResult<bool> {
        Ok(User::set_avatar(&self.pool, user_id, file_id).await?)
    }

    async fn list_visible_projects(&self, user_id: i64) -> StoreResult<Vec<Project>> {
        Ok(Project::list_visible(&self.pool, user_id).await?)
    }

    async fn find_project(&self, id: i64) -> StoreResult<Option<Project>> {
        Ok(Project::find_by_id(&self.pool, id).await?)
    }

    async fn create_project(&self, data: NewProject) -> StoreResult<Project> {
        Ok(Project::create(&self.pool, data).await?)
    }

    async fn save_project(&self, project: &Project) -> StoreResult<Project> {
        Ok(Project::save(&self.pool, project).await?)
    }

    async fn set_tasks_order(
        &self,
        project_id: i64,
        tasks_order: &[i64],
    ) -> StoreResult<Option<Project>> {
        Ok(Project::set_tasks_order(&self.pool, project_id, tasks_order).await?)
    }

    async fn is_collaborator(&self, project_id: i64, user_id: i64) -> StoreResult<bool> {
        Ok(Collaborator::find(&self.pool, project_id, user_id)
            .await?
            .is_some())
    }

    async fn add_collaborator(&self, project_id: i64, user_id: i64) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        Collaborator::create(&mut tx, project_id, user_id).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn remove_collaborator(&self, project_id: i64, user_id: i64) -> StoreResult<bool> {
        Ok(Collaborator::delete(&self.pool, project_id, user_id).await?)
    }

    async fn create_invite(&self, data: NewInvite) -> StoreResult<Invite> {
        Ok(Invite::create(&self.pool, data).await?)
    }

    async fn find_invite_by_code(&self, code: &str) -> StoreResult<Option<Invite>> {
        Ok(Invite::find_by_code(&self.pool, code).await?)
    }

    async fn mark_invite_sent(&self, id: i64) -> StoreResult<Option<Invite>> {
        Ok(Invite::mark_sent(&self.pool, id).await?)
    }

    async fn accept_invite(
        &self,
        invite_id: i64,
        project_id: i64,
        user_id: i64,
        add_collaborator: bool,
    ) -> StoreResult<()> {
        Ok(Invite::accept(&self.pool, invite_id, project_id, user_id, add_collaborator).await?)
    }

    async fn list_tasks(&self, project_id: i64) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_project(&self.pool, project_id).await?)
    }

    async fn find_task(&self, id: i64) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn create_task(&self, data: NewTask) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn save_task(&self, task: &Task) -> StoreResult<Task> {
        Ok(Task::save(&self.pool, task).await?)
    }

    async fn delete_task(&self, task: &Task) -> StoreResult<()> {
        Ok(Task::soft_delete(&self.pool, task).await?)
    }
}
