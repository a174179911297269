/// Request authentication
///
/// Resolves the `Authorization` header into an [`AuthContext`]: the token is
/// validated, the user is loaded, and the token's issue time is checked
/// against the user's `allow_datetime` cut-off. The API's auth layer inserts
/// the resulting context as a request extension; handlers take it as an
/// extractor.
///
/// Both `Bearer <token>` and the legacy `JWT <token>` prefixes are accepted.
///
/// # Example
///
/// ```no_run
/// use tasklane_shared::auth::middleware::AuthContext;
///
/// async fn handler(auth: AuthContext) -> String {
///     format!("Hello, user {}!", auth.user_id)
/// }
/// ```

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::jwt::{validate_token, JwtError};
use crate::store::Store;

/// Accepted authorization schemes
const TOKEN_PREFIXES: [&str; 2] = ["Bearer ", "JWT "];

/// Identity of the caller, added to request extensions after authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: i64,

    /// Unix timestamp the token was issued at
    pub issued_at: i64,
}

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing credentials")]
    MissingCredentials,

    #[error("Expected Bearer token")]
    InvalidFormat,

    #[error("{0}")]
    InvalidToken(String),

    /// User is gone, inactive, or the token predates its cut-off
    #[error("Token is no longer valid")]
    Revoked,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match self {
            AuthError::Storage(ref e) => {
                tracing::error!(error = %e, "Storage failure during authentication");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
            _ => (StatusCode::UNAUTHORIZED, "unauthorized"),
        };

        let message = match self {
            AuthError::Storage(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}

/// Extracts the raw token from an `Authorization` header value
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingCredentials)?;

    TOKEN_PREFIXES
        .iter()
        .find_map(|prefix| header.strip_prefix(prefix))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidFormat)
}

/// Authenticates a request from its `Authorization` header
///
/// # Errors
///
/// - `MissingCredentials` / `InvalidFormat` for a missing or malformed header
/// - `InvalidToken` if the signature or time claims do not validate
/// - `Revoked` if the user no longer accepts the token
pub async fn authenticate(
    store: &dyn Store,
    secret: &str,
    authorization: Option<&str>,
) -> Result<AuthContext, AuthError> {
    let token = bearer_token(authorization)?;

    let claims = validate_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::NotYetValid => AuthError::InvalidToken("Token not yet valid".to_string()),
        other => AuthError::InvalidToken(format!("Invalid token: {}", other)),
    })?;

    let user = store
        .find_user(claims.user_id)
        .await
        .map_err(|e| AuthError::Storage(e.to_string()))?
        .ok_or(AuthError::Revoked)?;

    if !user.accepts_token_issued_at(claims.iat) {
        tracing::debug!(user_id = user.id, iat = claims.iat, "Rejected revoked token");
        return Err(AuthError::Revoked);
    }

    Ok(AuthContext {
        user_id: user.id,
        issued_at: claims.iat,
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .ok_or(AuthError::MissingCredentials)
    }
}
