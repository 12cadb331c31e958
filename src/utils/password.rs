//! Argon2id password hashing.

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand::RngCore;
use serde_json::json;
use std::sync::LazyLock;

use crate::error::AppError;

/// Hashes a password into a PHC string with a random 16-byte salt.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let mut salt_bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut salt_bytes);

    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| {
        AppError::internal("Failed to encode salt", json!({ "reason": e.to_string() }))
    })?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            AppError::internal("Failed to hash password", json!({ "reason": e.to_string() }))
        })
}

/// Checks a password against a stored PHC string.
///
/// A stored value that does not parse is treated as a mismatch.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        tracing::warn!("Stored password hash is malformed");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Hash checked when no account matches, so a miss costs one verification too.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("linkhub-dummy-password").ok());

/// Runs a full verification against a throwaway hash. Always false.
pub fn verify_dummy(password: &str) -> bool {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Secret123").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Secret123", &hash));
        assert!(!verify_password("secret123", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("Secret123").unwrap();
        let b = hash_password("Secret123").unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn test_dummy_verification_never_matches() {
        assert!(!verify_dummy("linkhub-dummy-password"));
        assert!(!verify_dummy("Secret123"));
        assert!(
            DUMMY_HASH
                .as_deref()
                .is_some_and(|hash| hash.starts_with("$argon2id$"))
        );
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        assert!(!verify_password("Secret123", "Secret123"));
        assert!(!verify_password("", ""));
    }
}
