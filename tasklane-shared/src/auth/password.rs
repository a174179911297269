/// Password hashing and generation
///
/// Passwords are combined with the server secret and hashed with Argon2id.
/// The secret is fed to Argon2 as its keyed "secret" input (a pepper), and
/// every hash gets a fresh random salt, so a leaked table is useless without
/// the server secret and identical passwords never share a hash.
///
/// # Example
///
/// ```
/// use tasklane_shared::auth::password::{generate_password, hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "server-secret-key-at-least-32-bytes-long";
/// let password = generate_password(16, false);
/// let hash = hash_password(&password, secret)?;
///
/// assert!(verify_password(&password, &hash, secret)?);
/// assert!(!verify_password("wrong_password", &hash, secret)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params, ParamsBuilder, Version,
};
use rand::{seq::SliceRandom, Rng};

const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const SPECIALS: &str = "^!\\$%&/()=?{[]}+~#-_.:,;<>|";

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

fn hasher(secret: &str, params: Params) -> Result<Argon2<'_>, PasswordError> {
    Argon2::new_with_secret(
        secret.as_bytes(),
        argon2::Algorithm::Argon2id,
        Version::V0x13,
        params,
    )
    .map_err(|e| PasswordError::HashError(format!("Invalid secret: {}", e)))
}

/// Hashes a password using Argon2id keyed with the server secret
///
/// Parameters: 64 MB memory, 3 passes, 4 lanes, 32-byte output, 16-byte
/// random salt. Output is a PHC string:
///
/// ```text
/// $argon2id$v=19$m=65536,t=3,p=4$<salt>$<hash>
/// ```
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails
pub fn hash_password(password: &str, secret: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(65536)
        .t_cost(3)
        .p_cost(4)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    let password_hash = hasher(secret, params)?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a stored hash
///
/// Returns `Ok(false)` on mismatch, including when the hash was produced
/// under a different server secret.
///
/// # Errors
///
/// Returns an error if the stored hash cannot be parsed or verification
/// fails for a reason other than a mismatch.
pub fn verify_password(password: &str, hash: &str, secret: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    // Cost parameters are read back from the PHC string
    match hasher(secret, Params::default())?.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

/// Generates a random password of exactly `length` characters
///
/// Each character is drawn from a randomly chosen character set that is
/// never the set used for the previous character, so no two adjacent
/// characters come from the same set. Sets are lowercase letters, uppercase
/// letters and digits, plus punctuation when `use_special_chars` is set.
pub fn generate_password(length: usize, use_special_chars: bool) -> String {
    let mut charsets: Vec<&[u8]> = vec![LOWERCASE.as_bytes(), UPPERCASE.as_bytes(), DIGITS.as_bytes()];
    if use_special_chars {
        charsets.push(SPECIALS.as_bytes());
    }

    let mut rng = rand::thread_rng();
    let mut password = String::with_capacity(length);
    let mut current = rng.gen_range(0..charsets.len());

    while password.len() < length {
        if let Some(&byte) = charsets[current].choose(&mut rng) {
            password.push(byte as char);
        }

        // Pick any set except the one just used
        let next = rng.gen_range(0..charsets.len() - 1);
        current = if next >= current { next + 1 } else { next };
    }

    password
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn charset_of(c: char) -> usize {
        [LOWERCASE, UPPERCASE, DIGITS, SPECIALS]
            .iter()
            .position(|set| set.contains(c))
            .expect("character outside every charset")
    }

    #[test]
    fn test_hash_password_format() {
        let hash = hash_password("test_password_123", SECRET).expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
        assert!(hash.contains("m=65536"));
        assert!(hash.contains("t=3"));
        assert!(hash.contains("p=4"));
    }

    #[test]
    fn test_hash_password_produces_different_salts() {
        let hash1 = hash_password("same_password", SECRET).unwrap();
        let hash2 = hash_password("same_password", SECRET).unwrap();

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("correct_password", SECRET).unwrap();

        assert!(verify_password("correct_password", &hash, SECRET).unwrap());
        assert!(!verify_password("wrong_password", &hash, SECRET).unwrap());
        assert!(!verify_password("", &hash, SECRET).unwrap());
    }

    #[test]
    fn test_verify_password_requires_same_secret() {
        let hash = hash_password("correct_password", SECRET).unwrap();

        let other = "another-secret-key-at-least-32-bytes";
        assert!(!verify_password("correct_password", &hash, other).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("password", "invalid_hash", SECRET).is_err());
        assert!(verify_password("password", "$argon2id$invalid", SECRET).is_err());
    }

    #[test]
    fn test_generate_password_length() {
        assert_eq!(generate_password(16, false).len(), 16);
        assert_eq!(generate_password(16, true).len(), 16);
        assert_eq!(generate_password(1, false).len(), 1);
        assert!(generate_password(0, false).is_empty());
    }

    #[test]
    fn test_generate_password_alternates_charsets() {
        for _ in 0..50 {
            let password = generate_password(32, true);
            let sets: Vec<usize> = password.chars().map(charset_of).collect();

            for pair in sets.windows(2) {
                assert_ne!(pair[0], pair[1], "adjacent characters share a charset in {}", password);
            }
        }
    }

    #[test]
    fn test_generate_password_without_specials() {
        for _ in 0..50 {
            let password = generate_password(24, false);
            assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }
}
