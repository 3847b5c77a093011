/// Password Hashing and Verification
///
/// Argon2id with the crate's default cost parameters. Hashes are PHC strings
/// (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), so verification reads the
/// algorithm and parameters back out of the stored value.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("invalid password hash format: {0}")]
    InvalidHashFormat(String),
}

/// Hash a password with a fresh random salt
///
/// # Errors
/// Returns `PasswordError::Hashing` if the salt or hash computation fails
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!("Failed to hash password: {}", e);
            PasswordError::Hashing(e.to_string())
        })
}

/// Verify a password against a stored hash
///
/// A wrong password is `Ok(false)`, not an error.
///
/// # Errors
/// Returns `PasswordError::InvalidHashFormat` if `hash` is not a usable
/// Argon2 PHC string
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHashFormat(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::InvalidHashFormat(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let password = "pw123456";
        let hash = hash_password(password).expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_verify_password() {
        let password = "pw123456";
        let hash = hash_password(password).expect("Failed to hash password");

        let is_valid = verify_password(password, &hash).expect("Failed to verify password");
        assert!(is_valid);
    }

    #[test]
    fn test_verify_wrong_password() {
        let hash = hash_password("password123").expect("Failed to hash password");

        let is_valid = verify_password("guest", &hash).expect("Failed to verify password");
        assert!(!is_valid);
    }

    #[test]
    fn test_hash_is_salted() {
        let hash1 = hash_password("password123").unwrap();
        let hash2 = hash_password("password123").unwrap();

        assert_ne!(hash1, hash2);
        assert!(verify_password("password123", &hash1).unwrap());
        assert!(verify_password("password123", &hash2).unwrap());
    }

    #[test]
    fn test_empty_password_round_trips() {
        let hash = hash_password("").unwrap();
        assert!(verify_password("", &hash).unwrap());
        assert!(!verify_password(" ", &hash).unwrap());
    }

    #[test]
    fn test_invalid_hash_is_an_error() {
        let result = verify_password("password123", "not a valid hash");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat(_))));
    }

    #[test]
    fn test_non_argon2_hash_is_an_error() {
        // Well-formed PHC string for an algorithm this hasher does not speak
        let result = verify_password(
            "password123",
            "$pbkdf2-sha256$i=1000$c2FsdHNhbHQ$ZmFrZWhhc2hmYWtlaGFzaGZha2VoYXNo",
        );
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat(_))));
    }
}
