/// Task endpoints
///
/// - `GET /v1/projects/:id/tasks` - Tasks of a project, oldest first
/// - `POST /v1/projects/:id/tasks` - Add a task to a project
/// - `PUT /v1/tasks/:id` - Update a task
/// - `DELETE /v1/tasks/:id` - Soft-delete a task
///
/// All of them require the caller to own or collaborate on the project.
/// Projects and tasks the caller cannot see answer `404`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{projects::find_project, Listing},
    schema::{load, Field, FieldKind, JsonObject, Schema},
};
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tasklane_shared::{
    auth::{
        authorization::{
            is_participant, project_visibility, task_deletion, NOT_OWNER, NOT_TASK_CREATOR,
        },
        middleware::AuthContext,
    },
    merge::merge_fields,
    models::{
        project::Project,
        task::{NewTask, Task},
    },
};
use validator::Validate;

pub const NOT_A_MEMBER: &str = "User is not a member of the project.";

#[derive(Debug, Deserialize, Validate)]
pub struct TaskInput {
    #[validate(length(min = 1, max = 80, message = "Length must be between 1 and 80."))]
    pub body: Option<String>,

    #[validate(length(max = 1000, message = "Longer than maximum length 1000."))]
    pub note: Option<String>,

    pub notification_date: Option<DateTime<Utc>>,

    pub is_completed: Option<bool>,

    pub assigned_to_user_id: Option<i64>,
}

impl Schema for TaskInput {
    const FIELDS: &'static [Field] = &[
        Field::required("body", FieldKind::String),
        Field::nullable("note", FieldKind::String),
        Field::nullable("notification_date", FieldKind::DateTime),
        Field::optional("is_completed", FieldKind::Boolean),
        Field::nullable("assigned_to_user_id", FieldKind::Integer),
    ];
}

/// Loads a project the caller participates in
async fn visible_project(
    state: &AppState,
    project_id: i64,
    user_id: i64,
) -> ApiResult<(Project, bool)> {
    let project = find_project(state, project_id).await?;
    let is_collaborator = state.store.is_collaborator(project.id, user_id).await?;

    project_visibility(&project, user_id, is_collaborator).require("Project", NOT_OWNER)?;

    Ok((project, is_collaborator))
}

/// Loads a live task together with its project, both visible to the caller
async fn visible_task(
    state: &AppState,
    task_id: i64,
    user_id: i64,
) -> ApiResult<(Task, Project, bool)> {
    let task = state
        .store
        .find_task(task_id)
        .await?
        .filter(|t| !t.is_deleted)
        .ok_or_else(|| ApiError::NotFound("Task not found.".to_string()))?;

    let project = find_project(state, task.project_id).await?;
    let is_collaborator = state.store.is_collaborator(project.id, user_id).await?;

    project_visibility(&project, user_id, is_collaborator).require("Task", NOT_OWNER)?;

    Ok((task, project, is_collaborator))
}

/// Assignees must take part in the project
async fn check_assignee(
    state: &AppState,
    project: &Project,
    assignee: Option<i64>,
) -> ApiResult<()> {
    let Some(user_id) = assignee else {
        return Ok(());
    };

    let is_collaborator = state.store.is_collaborator(project.id, user_id).await?;
    if !is_participant(project, user_id, is_collaborator) {
        return Err(ApiError::invalid_field("assigned_to_user_id", NOT_A_MEMBER));
    }

    Ok(())
}

pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(project_id): Path<i64>,
) -> ApiResult<Json<Listing<Task>>> {
    let (project, _) = visible_project(&state, project_id, auth.user_id).await?;

    let tasks = state.store.list_tasks(project.id).await?;
    Ok(Json(tasks.into()))
}

/// Create a task
///
/// The new task id is appended to the project's `tasks_order`. Tasks start
/// out incomplete; `is_completed` is not accepted here.
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(project_id): Path<i64>,
    JsonObject(payload): JsonObject,
) -> ApiResult<Json<Task>> {
    let (project, _) = visible_project(&state, project_id, auth.user_id).await?;

    let loaded = load::<TaskInput>(&payload, &["is_completed"], false)?;
    check_assignee(&state, &project, loaded.input.assigned_to_user_id).await?;

    let mut draft = NewTask::draft(auth.user_id, project.id);
    merge_fields(&mut draft, &loaded.data, &[], &[])?;

    let task = state.store.create_task(draft).await?;

    tracing::info!(task_id = task.id, project_id = project.id, "Task created");

    Ok(Json(task))
}

/// Update a task
///
/// Marking a task complete records who completed it and when; reopening it
/// clears both.
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
    JsonObject(payload): JsonObject,
) -> ApiResult<Json<Task>> {
    let (mut task, project, _) = visible_task(&state, id, auth.user_id).await?;

    let loaded = load::<TaskInput>(&payload, &[], true)?;
    check_assignee(&state, &project, loaded.input.assigned_to_user_id).await?;

    merge_fields(&mut task, &loaded.data, &[], &[])?;
    task.sync_completion(auth.user_id, Utc::now());

    let task = state.store.save_task(&task).await?;

    Ok(Json(task))
}

/// Delete a task
///
/// Allowed for the task's creator and the project owner. The task is removed
/// from the project's `tasks_order`.
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let (task, project, is_collaborator) = visible_task(&state, id, auth.user_id).await?;

    task_deletion(&task, &project, auth.user_id, is_collaborator)
        .require("Task", NOT_TASK_CREATOR)?;

    state.store.delete_task(&task).await?;

    tracing::info!(task_id = id, project_id = project.id, "Task deleted");

    Ok(Json(json!({})))
}
