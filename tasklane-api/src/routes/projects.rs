/// Project endpoints
///
/// - `GET /v1/projects` - Projects the caller owns or collaborates on
/// - `POST /v1/projects` - Create a project owned by the caller
/// - `PUT /v1/projects/:id` - Update a project
/// - `DELETE /v1/projects/:id` - Soft-delete a project (owner only)
///
/// # Permissions
///
/// Any authenticated user may update a project by id, but only the owner may
/// change `is_deleted`; for everyone else the field is dropped from the
/// payload without an error. Deleting as a non-owner answers exactly like
/// deleting a project that does not exist.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::Listing,
    schema::{load, Field, FieldKind, JsonObject, Schema},
};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tasklane_shared::{
    auth::{
        authorization::{project_deletion, project_update_scope, NOT_OWNER},
        middleware::AuthContext,
    },
    merge::merge_fields,
    models::project::{NewProject, Project},
};
use validator::Validate;

/// Project payload, shared by create and update
#[derive(Debug, Deserialize, Validate)]
pub struct ProjectInput {
    #[validate(length(min = 1, max = 80, message = "Length must be between 1 and 80."))]
    pub name: Option<String>,

    pub tasks_order: Option<Vec<i64>>,

    pub is_shared: Option<bool>,

    pub is_deleted: Option<bool>,
}

impl Schema for ProjectInput {
    const FIELDS: &'static [Field] = &[
        Field::required("name", FieldKind::String),
        Field::optional("tasks_order", FieldKind::IntegerList),
        Field::optional("is_shared", FieldKind::Boolean),
        Field::optional("is_deleted", FieldKind::Boolean),
    ];
}

/// Loads a project or answers 404
pub(crate) async fn find_project(state: &AppState, id: i64) -> ApiResult<Project> {
    state
        .store
        .find_project(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found.".to_string()))
}

pub async fn list_projects(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Listing<Project>>> {
    let projects = state.store.list_visible_projects(auth.user_id).await?;
    Ok(Json(projects.into()))
}

/// Create a project
///
/// `is_deleted` is not accepted on creation.
pub async fn create_project(
    State(state): State<AppState>,
    auth: AuthContext,
    JsonObject(payload): JsonObject,
) -> ApiResult<Json<Project>> {
    let loaded = load::<ProjectInput>(&payload, &["is_deleted"], false)?;

    let mut draft = NewProject::owned_by(auth.user_id);
    merge_fields(&mut draft, &loaded.data, &[], &[])?;

    let project = state.store.create_project(draft).await?;

    tracing::info!(project_id = project.id, owner_id = project.owner_id, "Project created");

    Ok(Json(project))
}

/// Update a project
///
/// Only the fields present in the payload are written; the stored
/// `tasks_order` is untouched unless the payload carries one.
pub async fn update_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
    JsonObject(payload): JsonObject,
) -> ApiResult<Json<Project>> {
    let mut project = find_project(&state, id).await?;

    let scope = project_update_scope(&project, auth.user_id);
    let loaded = load::<ProjectInput>(&payload, scope.excluded_fields(), true)?;

    let written = merge_fields(&mut project, &loaded.data, &[], scope.excluded_fields())?;

    let mut saved = state.store.save_project(&project).await?;
    if written.iter().any(|field| field == "tasks_order") {
        saved = state
            .store
            .set_tasks_order(project.id, &project.tasks_order)
            .await?
            .ok_or_else(|| ApiError::NotFound("Project not found.".to_string()))?;
    }

    tracing::debug!(project_id = id, user_id = auth.user_id, fields = ?written, "Project updated");

    Ok(Json(saved))
}

pub async fn delete_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let mut project = find_project(&state, id).await?;

    project_deletion(&project, auth.user_id).require("Project", NOT_OWNER)?;

    project.is_deleted = true;
    state.store.save_project(&project).await?;

    tracing::info!(project_id = id, "Project deleted");

    Ok(Json(json!({})))
}
