/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`jwt`]: Token issuance and validation (HS256)
/// - [`password`]: Password hashing (Argon2id with a server-side pepper) and generation
/// - [`middleware`]: Bearer token authentication producing an [`middleware::AuthContext`]
/// - [`authorization`]: Ownership and visibility policies for projects and tasks
///
/// # Example
///
/// ```no_run
/// use tasklane_shared::auth::jwt::{issue_token, validate_token, TokenSettings};
/// use tasklane_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "server-secret-key-at-least-32-bytes-long";
/// let hash = hash_password("hunter22", secret)?;
/// assert!(verify_password("hunter22", &hash, secret)?);
///
/// let token = issue_token(42, secret, &TokenSettings::default())?;
/// let claims = validate_token(&token, secret)?;
/// assert_eq!(claims.user_id, 42);
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
