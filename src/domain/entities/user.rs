//! User entity representing an account that owns a profile and links.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A registered account.
///
/// `password_hash` is an Argon2 PHC string and `refresh_token_hash` is the
/// keyed digest of the currently valid refresh token (`None` after logout).
/// Neither is ever serialized to clients.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub refresh_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input data for creating a new user.
///
/// `username` and `email` must already be normalized to lowercase.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Whitelisted account update.
///
/// `email` must already be normalized and `password_hash` already hashed.
/// Storing a new password hash also ends the current session.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl UserPatch {
    /// Returns true if the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password_hash.is_none()
    }
}

/// Lowercases and trims an identifier so uniqueness is case-insensitive.
pub fn normalize_identifier(value: &str) -> String {
    value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_patch_is_empty() {
        assert!(UserPatch::default().is_empty());

        let patch = UserPatch {
            email: Some("new@example.com".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier("  Alice_01 "), "alice_01");
        assert_eq!(normalize_identifier("Bob@Example.COM"), "bob@example.com");
    }
}
