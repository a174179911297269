/// JWT token issuance and validation
///
/// Tokens are signed with HS256 using the server secret. Each token carries
/// the user id plus `iat`, `exp` and `nbf` timestamps; the expiration and
/// not-before offsets are configured durations relative to the issue time.
///
/// # Example
///
/// ```
/// use tasklane_shared::auth::jwt::{issue_token, validate_token, TokenSettings};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "your-secret-key-at-least-32-bytes";
/// let token = issue_token(7, secret, &TokenSettings::default())?;
///
/// let claims = validate_token(&token, secret)?;
/// assert_eq!(claims.user_id, 7);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token is not valid yet (`nbf` in the future)
    #[error("Token is not valid yet")]
    NotYetValid,
}

/// Expiration and not-before offsets applied at issue time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSettings {
    /// `exp = iat + expiration`
    pub expiration: Duration,

    /// `nbf = iat + not_before`
    pub not_before: Duration,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            expiration: Duration::seconds(300),
            not_before: Duration::zero(),
        }
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user
    pub user_id: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims issued now with the configured offsets
    ///
    /// # Example
    ///
    /// ```
    /// use tasklane_shared::auth::jwt::{Claims, TokenSettings};
    ///
    /// let claims = Claims::new(1, &TokenSettings::default());
    /// assert_eq!(claims.exp - claims.iat, 300);
    /// ```
    pub fn new(user_id: i64, settings: &TokenSettings) -> Self {
        let now = Utc::now();

        Self {
            user_id,
            iat: now.timestamp(),
            exp: (now + settings.expiration).timestamp(),
            nbf: (now + settings.not_before).timestamp(),
        }
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims into a token string
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Issues a token for a user
///
/// Convenience wrapper around [`Claims::new`] and [`create_token`].
pub fn issue_token(
    user_id: i64,
    secret: &str,
    settings: &TokenSettings,
) -> Result<String, JwtError> {
    create_token(&Claims::new(user_id, settings), secret)
}

/// Validates a token and extracts its claims
///
/// Verifies the HS256 signature, `exp` and `nbf`.
///
/// # Errors
///
/// - `JwtError::Expired` if `exp` has passed
/// - `JwtError::NotYetValid` if `nbf` is in the future
/// - `JwtError::ValidationError` for any other failure (bad signature, malformed token)
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.set_required_spec_claims(&["exp", "nbf", "iat"]);

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::ImmatureSignature => JwtError::NotYetValid,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
