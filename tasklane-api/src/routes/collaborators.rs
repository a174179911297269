/// Collaborator endpoints
///
/// - `DELETE /v1/collaborators` - Remove a collaborator from a project
///
/// Only the association is removed; the user account is untouched.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::projects::find_project,
    schema::{load, Field, FieldKind, JsonObject, Schema},
};
use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tasklane_shared::auth::{
    authorization::{project_management, NOT_OWNER},
    middleware::AuthContext,
};
use validator::Validate;

pub const INVALID_COLLABORATOR: &str = "Invalid collaborator.";

#[derive(Debug, Deserialize, Validate)]
pub struct RemoveCollaboratorRequest {
    pub project_id: i64,
    pub collaborator_id: i64,
}

impl Schema for RemoveCollaboratorRequest {
    const FIELDS: &'static [Field] = &[
        Field::required("project_id", FieldKind::Integer),
        Field::required("collaborator_id", FieldKind::Integer),
    ];
}

/// Remove a collaborator
///
/// ```text
/// DELETE /v1/collaborators
///
/// {"project_id": 4, "collaborator_id": 9}
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: Validation failed, caller is not the owner, or the
///   user is not a collaborator of the project
/// - `404 Not Found`: Project does not exist
pub async fn remove_collaborator(
    State(state): State<AppState>,
    auth: AuthContext,
    JsonObject(payload): JsonObject,
) -> ApiResult<Json<Value>> {
    let req = load::<RemoveCollaboratorRequest>(&payload, &[], false)?.input;

    let project = find_project(&state, req.project_id).await?;

    project_management(&project, auth.user_id).require("Project", NOT_OWNER)?;

    if !state
        .store
        .remove_collaborator(project.id, req.collaborator_id)
        .await?
    {
        return Err(ApiError::Forbidden(INVALID_COLLABORATOR.to_string()));
    }

    tracing::info!(
        project_id = project.id,
        collaborator_id = req.collaborator_id,
        "Collaborator removed"
    );

    Ok(Json(json!({})))
}
