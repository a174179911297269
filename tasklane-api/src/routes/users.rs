/// Current user endpoints
///
/// - `GET /v1/users/me` - Profile of the authenticated user
/// - `PUT /v1/users/me/avatar` - Attach an uploaded file as avatar

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    schema::{load, Field, FieldKind, JsonObject, Schema},
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tasklane_shared::{
    auth::middleware::AuthContext,
    models::{
        file::{CreateFile, File},
        user::User,
    },
};
use validator::Validate;

/// User profile with the avatar resolved
#[derive(Debug, Serialize)]
pub struct Profile {
    #[serde(flatten)]
    pub user: User,

    pub avatar: Option<File>,
}

/// Avatar upload descriptor
#[derive(Debug, Deserialize, Validate)]
pub struct AvatarRequest {
    #[validate(length(max = 250, message = "Longer than maximum length 250."))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 250, message = "Length must be between 1 and 250."))]
    pub key: String,
}

impl Schema for AvatarRequest {
    const FIELDS: &'static [Field] = &[
        Field::nullable("name", FieldKind::String),
        Field::required("key", FieldKind::String),
    ];
}

async fn profile(state: &AppState, user_id: i64) -> ApiResult<Profile> {
    let user = state
        .store
        .find_user(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    let avatar = match user.avatar_id {
        Some(file_id) => state.store.find_file(file_id).await?,
        None => None,
    };

    Ok(Profile { user, avatar })
}

pub async fn me(State(state): State<AppState>, auth: AuthContext) -> ApiResult<Json<Profile>> {
    Ok(Json(profile(&state, auth.user_id).await?))
}

/// Replace the avatar
///
/// The file itself lives in external object storage; only its name and key
/// are recorded.
pub async fn set_avatar(
    State(state): State<AppState>,
    auth: AuthContext,
    JsonObject(payload): JsonObject,
) -> ApiResult<Json<Profile>> {
    let req = load::<AvatarRequest>(&payload, &[], false)?.input;

    let file = state
        .store
        .create_file(CreateFile {
            name: req.name,
            key: Some(req.key),
        })
        .await?;

    if !state.store.set_avatar(auth.user_id, file.id).await? {
        return Err(ApiError::NotFound("User not found.".to_string()));
    }

    tracing::info!(user_id = auth.user_id, file_id = file.id, "Avatar updated");

    Ok(Json(profile(&state, auth.user_id).await?))
}
