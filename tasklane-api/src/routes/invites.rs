/// Invite endpoints
///
/// - `POST /v1/projects/:id/invites` - Invite someone by email (owner only)
/// - `POST /v1/invites/:code/accept` - Join the project an invite points to
///
/// An invite is consumed when accepted. Delivery is best-effort: if the email
/// cannot be sent the invite is still stored, with `is_sent` left false.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::projects::find_project,
    schema::{load, Field, FieldKind, JsonObject, Schema},
};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tasklane_shared::{
    auth::{
        authorization::{project_management, NOT_OWNER},
        middleware::AuthContext,
    },
    models::{
        invite::{Invite, NewInvite, EMAIL_INVITE},
        project::Project,
    },
    notify::{templates::INVITE, Email},
};
use uuid::Uuid;
use validator::Validate;

pub const WRONG_RECIPIENT: &str = "This invite was sent to a different email address.";

#[derive(Debug, Deserialize, Validate)]
pub struct InviteRequest {
    #[validate(
        email(message = "Not a valid email address."),
        length(max = 80, message = "Longer than maximum length 80.")
    )]
    pub email: String,
}

impl Schema for InviteRequest {
    const FIELDS: &'static [Field] = &[Field::required("email", FieldKind::String)];
}

/// Link the invitee follows to accept
pub fn invite_link(public_url: &str, code: &str) -> String {
    format!("{}/invites/{}", public_url.trim_end_matches('/'), code)
}

/// Invite a collaborator
///
/// # Errors
///
/// - `403 Forbidden`: Validation failed or caller is not the owner
/// - `404 Not Found`: Project missing or deleted
pub async fn create_invite(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(project_id): Path<i64>,
    JsonObject(payload): JsonObject,
) -> ApiResult<Json<Invite>> {
    let req = load::<InviteRequest>(&payload, &[], false)?.input;

    let project = find_project(&state, project_id).await?;
    if project.is_deleted {
        return Err(ApiError::NotFound("Project not found.".to_string()));
    }

    project_management(&project, auth.user_id).require("Project", NOT_OWNER)?;

    let inviter = state
        .store
        .find_user(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    let code = Uuid::new_v4().simple().to_string();
    let link = invite_link(&state.config.api.public_url, &code);

    let invite = state
        .store
        .create_invite(NewInvite {
            invite_type: EMAIL_INVITE.to_string(),
            project_id: project.id,
            email: req.email.clone(),
            invite_link: link.clone(),
            code,
        })
        .await?;

    let email = Email {
        template: INVITE,
        subject: format!("{} invited you to {}", inviter.name, project.name),
        params: json!({
            "inviter": inviter.name,
            "project": project.name,
            "invite_link": link,
        }),
        recipients: vec![req.email],
    };

    let invite = match state.notifier.send_email(email).await {
        Ok(dispatch) if dispatch.is_delivered() => state
            .store
            .mark_invite_sent(invite.id)
            .await?
            .unwrap_or(invite),
        Ok(_) => invite,
        Err(e) => {
            tracing::warn!(invite_id = invite.id, error = %e, "Invite email not sent");
            invite
        }
    };

    tracing::info!(invite_id = invite.id, project_id = project.id, "Invite created");

    Ok(Json(invite))
}

/// Accept an invite
///
/// The caller's account email must match the invite. Accepting a project the
/// caller already participates in just consumes the invite.
pub async fn accept_invite(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(code): Path<String>,
) -> ApiResult<Json<Project>> {
    let invite = state
        .store
        .find_invite_by_code(&code)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invite not found.".to_string()))?;

    let user = state
        .store
        .find_user(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    if !user.email.eq_ignore_ascii_case(&invite.email) {
        return Err(ApiError::Forbidden(WRONG_RECIPIENT.to_string()));
    }

    let project_id = invite
        .project_id
        .ok_or_else(|| ApiError::NotFound("Project not found.".to_string()))?;
    let project = find_project(&state, project_id).await?;
    if project.is_deleted {
        return Err(ApiError::NotFound("Project not found.".to_string()));
    }

    let add_collaborator = !project.is_owned_by(user.id)
        && !state.store.is_collaborator(project.id, user.id).await?;

    state
        .store
        .accept_invite(invite.id, project.id, user.id, add_collaborator)
        .await?;

    tracing::info!(
        invite_id = invite.id,
        project_id = project.id,
        user_id = user.id,
        joined = add_collaborator,
        "Invite accepted"
    );

    Ok(Json(project))
}
