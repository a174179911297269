/// Authentication endpoints
///
/// - `POST /v1/auth/register` - Create an account and get a token
/// - `POST /v1/auth/login` - Exchange email and password for a token
/// - `POST /v1/auth/reset-password` - Email a freshly generated password
///
/// Tokens carry `user_id`, `iat`, `nbf` and `exp` and are signed with the
/// server secret. Resetting a password moves the user's `allow_datetime`
/// forward, so every token issued before the reset stops working.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    schema::{load, Field, FieldKind, JsonObject, Schema},
};
use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tasklane_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, User},
    notify::{templates::FORGOTTEN_PASSWORD, Email},
};
use validator::Validate;

/// Length of passwords generated on reset
pub const RESET_PASSWORD_LENGTH: usize = 16;

const INVALID_CREDENTIALS: &str = "Invalid email or password.";

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 80, message = "Length must be between 1 and 80."))]
    pub name: String,

    #[validate(
        email(message = "Not a valid email address."),
        length(max = 80, message = "Longer than maximum length 80.")
    )]
    pub email: String,

    #[validate(length(min = 8, message = "Shorter than minimum length 8."))]
    pub password: String,
}

impl Schema for RegisterRequest {
    const FIELDS: &'static [Field] = &[
        Field::required("name", FieldKind::String),
        Field::required("email", FieldKind::String),
        Field::required("password", FieldKind::String),
    ];
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Schema for LoginRequest {
    const FIELDS: &'static [Field] = &[
        Field::required("email", FieldKind::String),
        Field::required("password", FieldKind::String),
    ];
}

/// Password reset request
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Not a valid email address."))]
    pub email: String,
}

impl Schema for ResetPasswordRequest {
    const FIELDS: &'static [Field] = &[Field::required("email", FieldKind::String)];
}

/// Token response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub user: User,
}

/// Register a new user
///
/// ```text
/// POST /v1/auth/register
///
/// {"name": "Ada", "email": "ada@example.com", "password": "correct horse"}
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: Validation failed
/// - `409 Conflict`: Email already exists
pub async fn register(
    State(state): State<AppState>,
    JsonObject(payload): JsonObject,
) -> ApiResult<Json<TokenResponse>> {
    let req = load::<RegisterRequest>(&payload, &[], false)?.input;

    let password_hash = password::hash_password(&req.password, state.secret())?;

    let user = state
        .store
        .create_user(CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
        })
        .await?;

    let token = jwt::issue_token(user.id, state.secret(), &state.token_settings())?;

    tracing::info!(user_id = user.id, "User registered");

    Ok(Json(TokenResponse { token, user }))
}

/// Log in with email and password
///
/// Unknown email and wrong password produce the same `401`.
pub async fn login(
    State(state): State<AppState>,
    JsonObject(payload): JsonObject,
) -> ApiResult<Json<TokenResponse>> {
    let req = load::<LoginRequest>(&payload, &[], false)?.input;

    let user = state
        .store
        .find_user_by_email(&req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    if !password::verify_password(&req.password, &user.password_hash, state.secret())? {
        tracing::debug!(user_id = user.id, "Login with wrong password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    if !user.active {
        return Err(ApiError::Unauthorized("Account is disabled.".to_string()));
    }

    let token = jwt::issue_token(user.id, state.secret(), &state.token_settings())?;

    Ok(Json(TokenResponse { token, user }))
}

/// Reset a password and email the new one
///
/// Always answers `{}` so the endpoint cannot be used to discover accounts.
/// The new hash is stored only once the email has been sent or queued;
/// otherwise the old password keeps working.
pub async fn reset_password(
    State(state): State<AppState>,
    JsonObject(payload): JsonObject,
) -> ApiResult<Json<Value>> {
    let req = load::<ResetPasswordRequest>(&payload, &[], false)?.input;

    let Some(user) = state.store.find_user_by_email(&req.email).await? else {
        tracing::debug!("Password reset for unknown email");
        return Ok(Json(json!({})));
    };

    if !user.active {
        return Ok(Json(json!({})));
    }

    let new_password = password::generate_password(RESET_PASSWORD_LENGTH, false);
    let password_hash = password::hash_password(&new_password, state.secret())?;

    let email = Email {
        template: FORGOTTEN_PASSWORD,
        subject: "Your new Tasklane password".to_string(),
        params: json!({ "name": user.name, "password": new_password }),
        recipients: vec![user.email.clone()],
    };

    match state.notifier.send_email(email).await {
        Ok(dispatch) if dispatch.is_delivered() => {
            state
                .store
                .update_password(user.id, &password_hash, Utc::now())
                .await?;

            tracing::info!(user_id = user.id, "Password reset");
        }
        Ok(_) => {
            tracing::warn!(user_id = user.id, "Password reset email dropped; password kept");
        }
        Err(e) => {
            tracing::warn!(user_id = user.id, error = %e, "Password reset email not sent");
        }
    }

    Ok(Json(json!({})))
}
