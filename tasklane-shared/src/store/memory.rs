/// In-memory [`Store`]
///
/// Keeps every table in process memory behind a single `tokio` `RwLock`.
/// It mirrors the constraints of the SQL schema that handlers rely on: unique
/// emails and invite codes, and foreign keys from projects, tasks and
/// collaborators to existing rows. Used by the integration tests and by the
/// server when `DATABASE_URL=memory://`.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{Store, StoreError, StoreResult};
use crate::models::{
    file::{CreateFile, File},
    invite::{Invite, NewInvite},
    project::{NewProject, Project},
    task::{NewTask, Task},
    user::{CreateUser, User, DEFAULT_ROLE},
};

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    files: BTreeMap<i64, File>,
    projects: BTreeMap<i64, Project>,
    collaborators: BTreeSet<(i64, i64)>,
    invites: BTreeMap<i64, Invite>,
    tasks: BTreeMap<i64, Task>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn require_user(&self, id: i64) -> StoreResult<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::MissingReference(format!("users({})", id)))
        }
    }

    fn require_project(&self, id: i64) -> StoreResult<()> {
        if self.projects.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::MissingReference(format!("projects({})", id)))
        }
    }
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles a user's `active` flag
    pub async fn set_user_active(&self, user_id: i64, active: bool) -> bool {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(&user_id) {
            Some(user) => {
                user.active = active;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        let taken = tables
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&data.email));
        if taken {
            return Err(StoreError::Duplicate("users_email_lower_key".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: tables.next_id(),
            name: data.name,
            email: data.email,
            password_hash: data.password_hash,
            role: Some(DEFAULT_ROLE.to_string()),
            allow_datetime: now,
            active: true,
            avatar_id: None,
            created_at: now,
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn update_password(
        &self,
        user_id: i64,
        password_hash: &str,
        allow_datetime: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(&user_id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.allow_datetime = allow_datetime;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create_file(&self, data: CreateFile) -> StoreResult<File> {
        let mut tables = self.tables.write().await;
        let file = File {
            id: tables.next_id(),
            name: data.name,
            key: data.key,
            created_at: Utc::now(),
        };
        tables.files.insert(file.id, file.clone());
        Ok(file)
    }

    async fn find_file(&self, id: i64) -> StoreResult<Option<File>> {
        Ok(self.tables.read().await.files.get(&id).cloned())
    }

    async fn set_avatar(&self, user_id: i64, file_id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.files.contains_key(&file_id) {
            return Err(StoreError::MissingReference(format!("files({})", file_id)));
        }
        match tables.users.get_mut(&user_id) {
            Some(user) => {
                user.avatar_id = Some(file_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_visible_projects(&self, user_id: i64) -> StoreResult<Vec<Project>> {
        let tables = self.tables.read().await;

        let mut projects: Vec<Project> = tables
            .projects
            .values()
            .filter(|p| !p.is_deleted)
            .filter(|p| p.owner_id == user_id || tables.collaborators.contains(&(p.id, user_id)))
            .cloned()
            .collect();

        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(projects)
    }

    async fn find_project(&self, id: i64) -> StoreResult<Option<Project>> {
        Ok(self.tables.read().await.projects.get(&id).cloned())
    }

    async fn create_project(&self, data: NewProject) -> StoreResult<Project> {
        let mut tables = self.tables.write().await;
        tables.require_user(data.owner_id)?;

        let project = Project {
            id: tables.next_id(),
            owner_id: data.owner_id,
            name: data.name,
            tasks_order: data.tasks_order,
            is_shared: data.is_shared,
            is_deleted: false,
            created_at: Utc::now(),
        };
        tables.projects.insert(project.id, project.clone());

        Ok(project)
    }

    async fn save_project(&self, project: &Project) -> StoreResult<Project> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .projects
            .get_mut(&project.id)
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))?;

        stored.name = project.name.clone();
        stored.is_shared = project.is_shared;
        stored.is_deleted = project.is_deleted;

        Ok(stored.clone())
    }

    async fn set_tasks_order(
        &self,
        project_id: i64,
        tasks_order: &[i64],
    ) -> StoreResult<Option<Project>> {
        let mut tables = self.tables.write().await;
        Ok(tables.projects.get_mut(&project_id).map(|project| {
            project.tasks_order = tasks_order.to_vec();
            project.clone()
        }))
    }

    async fn is_collaborator(&self, project_id: i64, user_id: i64) -> StoreResult<bool> {
        Ok(self
            .tables
            .read()
            .await
            .collaborators
            .contains(&(project_id, user_id)))
    }

    async fn add_collaborator(&self, project_id: i64, user_id: i64) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.require_project(project_id)?;
        tables.require_user(user_id)?;
        tables.collaborators.insert((project_id, user_id));
        Ok(())
    }

    async fn remove_collaborator(&self, project_id: i64, user_id: i64) -> StoreResult<bool> {
        Ok(self
            .tables
            .write()
            .await
            .collaborators
            .remove(&(project_id, user_id)))
    }

    async fn create_invite(&self, data: NewInvite) -> StoreResult<Invite> {
        let mut tables = self.tables.write().await;
        tables.require_project(data.project_id)?;

        let code_taken = tables
            .invites
            .values()
            .any(|i| i.code.as_deref() == Some(data.code.as_str()));
        if code_taken {
            return Err(StoreError::Duplicate("invites_code_key".to_string()));
        }

        let invite = Invite {
            id: tables.next_id(),
            invite_type: Some(data.invite_type),
            project_id: Some(data.project_id),
            email: data.email,
            invite_link: Some(data.invite_link),
            code: Some(data.code),
            is_sent: false,
            created_at: Utc::now(),
        };
        tables.invites.insert(invite.id, invite.clone());

        Ok(invite)
    }

    async fn find_invite_by_code(&self, code: &str) -> StoreResult<Option<Invite>> {
        Ok(self
            .tables
            .read()
            .await
            .invites
            .values()
            .find(|i| i.code.as_deref() == Some(code))
            .cloned())
    }

    async fn mark_invite_sent(&self, id: i64) -> StoreResult<Option<Invite>> {
        let mut tables = self.tables.write().await;
        Ok(tables.invites.get_mut(&id).map(|invite| {
            invite.is_sent = true;
            invite.clone()
        }))
    }

    async fn accept_invite(
        &self,
        invite_id: i64,
        project_id: i64,
        user_id: i64,
        add_collaborator: bool,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write().await;

        if add_collaborator {
            tables.require_project(project_id)?;
            tables.require_user(user_id)?;
            tables.collaborators.insert((project_id, user_id));
        }
        tables.invites.remove(&invite_id);

        Ok(())
    }

    async fn list_tasks(&self, project_id: i64) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;

        let mut tasks: Vec<Task> = tables
            .tasks
            .values()
            .filter(|t| t.project_id == project_id && !t.is_deleted)
            .cloned()
            .collect();

        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(tasks)
    }

    async fn find_task(&self, id: i64) -> StoreResult<Option<Task>> {
        Ok(self.tables.read().await.tasks.get(&id).cloned())
    }

    async fn create_task(&self, data: NewTask) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;
        tables.require_user(data.creator_id)?;
        tables.require_project(data.project_id)?;

        let task = Task {
            id: tables.next_id(),
            creator_id: data.creator_id,
            project_id: data.project_id,
            body: data.body,
            note: data.note,
            notification_date: data.notification_date,
            is_completed: false,
            completion_date: None,
            completed_by_user_id: None,
            assigned_to_user_id: data.assigned_to_user_id,
            is_deleted: false,
            created_at: Utc::now(),
        };

        if let Some(project) = tables.projects.get_mut(&task.project_id) {
            project.tasks_order.push(task.id);
        }
        tables.tasks.insert(task.id, task.clone());

        Ok(task)
    }

    async fn save_task(&self, task: &Task) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .tasks
            .get_mut(&task.id)
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))?;

        stored.body = task.body.clone();
        stored.note = task.note.clone();
        stored.notification_date = task.notification_date;
        stored.is_completed = task.is_completed;
        stored.completion_date = task.completion_date;
        stored.completed_by_user_id = task.completed_by_user_id;
        stored.assigned_to_user_id = task.assigned_to_user_id;
        stored.is_deleted = task.is_deleted;

        Ok(stored.clone())
    }

    async fn delete_task(&self, task: &Task) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .tasks
            .get_mut(&task.id)
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))?
            .is_deleted = true;

        if let Some(project) = tables.projects.get_mut(&task.project_id) {
            project.tasks_order.retain(|&id| id != task.id);
        }

        Ok(())
    }
}
