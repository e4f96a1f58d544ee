//! Password hashing and verification.
//!
//! Credentials are stored as Argon2id digests (salted, default work factor).
//! Hashing happens exactly once, in the repository paths that set or change
//! the credential; every other update leaves the stored digest untouched.

use argon2::{
    Argon2,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors from credential handling.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// The candidate password does not meet requirements.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// Hashing failed.
    #[error("failed to hash password")]
    Hash,

    /// The stored digest could not be parsed.
    #[error("stored password hash is malformed")]
    MalformedHash,
}

/// Validate that a plaintext password meets requirements.
///
/// # Errors
///
/// Returns `CredentialError::WeakPassword` when the password is too short.
pub fn validate_password(password: &str) -> Result<(), CredentialError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CredentialError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id with a fresh random salt.
///
/// # Errors
///
/// Returns `CredentialError::Hash` if the hasher fails.
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| CredentialError::Hash)
}

/// Verify a candidate password against a stored digest.
///
/// Returns `Ok(false)` on a mismatch; an error only when the stored digest
/// itself is unusable.
///
/// # Errors
///
/// Returns `CredentialError::MalformedHash` if the digest cannot be parsed.
pub fn verify_password(candidate: &str, digest: &str) -> Result<bool, CredentialError> {
    let parsed = PasswordHash::new(digest).map_err(|_| CredentialError::MalformedHash)?;
    let argon2 = Argon2::default();

    match argon2.verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(_) => Err(CredentialError::MalformedHash),
    }
}

/// Whether a stored value already is an Argon2 digest.
///
/// Guards against double-hashing when a caller hands back an already-hashed
/// credential.
#[must_use]
pub fn is_hashed(value: &str) -> bool {
    PasswordHash::new(value).is_ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let digest = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &digest).unwrap());
        assert!(!verify_password("wrong password", &digest).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("swordfish-9").unwrap();
        let b = hash_password("swordfish-9").unwrap();
        // Distinct salts produce distinct digests, but both verify.
        assert_ne!(a, b);
        assert!(verify_password("swordfish-9", &a).unwrap());
        assert!(verify_password("swordfish-9", &b).unwrap());
    }

    #[test]
    fn test_digest_is_not_plaintext() {
        let digest = hash_password("hunter2hunter2").unwrap();
        assert!(!digest.contains("hunter2"));
        assert!(digest.starts_with("$argon2"));
    }

    #[test]
    fn test_verify_malformed_digest() {
        assert!(matches!(
            verify_password("anything", "not-a-digest"),
            Err(CredentialError::MalformedHash)
        ));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_is_hashed() {
        let digest = hash_password("some password").unwrap();
        assert!(is_hashed(&digest));
        assert!(!is_hashed("some password"));
    }
}
