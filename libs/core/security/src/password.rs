// [libs/core/security/src/password.rs]
//! Argon2id password hashing with a per-call random salt, per spec.md
//! §4.1's "adaptive, memory-hard hash" invariant.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use thiserror::Error;

/// Passwords shorter than this are rejected before they are ever hashed.
pub const MIN_PASSWORD_LENGTH: usize = 10;

#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,
    #[error("password hashing failed: {0}")]
    HashFailure(String),
    #[error("password verification failed: {0}")]
    VerifyFailure(String),
}

/// Hashes `password` with Argon2id and a freshly generated random salt.
/// Returns the full PHC-formatted string (algorithm, params, salt, and
/// hash all in one), so no separate salt column is needed.
pub fn hash_password(password: &str) -> Result<String, SecurityError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(SecurityError::PasswordTooShort);
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| SecurityError::HashFailure(e.to_string()))
}

/// Verifies `password` against a PHC-formatted hash produced by
/// [`hash_password`]. Returns `Ok(false)` for a mismatch, `Err` only if
/// the stored hash itself is malformed.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, SecurityError> {
    let parsed_hash =
        PasswordHash::new(stored_hash).map_err(|e| SecurityError::VerifyFailure(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_passwords() {
        assert!(matches!(
            hash_password("short1"),
            Err(SecurityError::PasswordTooShort)
        ));
    }

    #[test]
    fn round_trips_a_valid_password() {
        let hash = hash_password("correct-horse-battery").unwrap();
        assert!(verify_password("correct-horse-battery", &hash).unwrap());
        assert!(!verify_password("wrong-password-entirely", &hash).unwrap());
    }

    #[test]
    fn same_password_hashes_differently_each_time() {
        let a = hash_password("correct-horse-battery").unwrap();
        let b = hash_password("correct-horse-battery").unwrap();
        assert_ne!(a, b, "salts must be random per call");
    }
}
