//! DTOs for user accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::dto::auth::validate_password_strength;
use crate::domain::entities::User;

/// Request body for `PATCH /users/me`.
///
/// Only the email and password can change; anything else in the body is
/// ignored. Username changes are not supported.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    #[validate(length(min = 8, max = 128, message = "Password must be at least 8 characters"))]
    #[validate(custom(function = "validate_password_strength"))]
    pub password: Option<String>,
}

/// The caller's own account. Never includes credentials.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// What anyone may learn about a user.
#[derive(Debug, Serialize)]
pub struct PublicUserResponse {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_user_rules() {
        let ok: UpdateUserRequest =
            serde_json::from_str(r#"{"email":"new@example.com","password":"NewSecret1"}"#)
                .unwrap();
        assert!(ok.validate().is_ok());

        let weak: UpdateUserRequest = serde_json::from_str(r#"{"password":"weakpass"}"#).unwrap();
        let errors = weak.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));

        let bad: UpdateUserRequest = serde_json::from_str(r#"{"email":"nope"}"#).unwrap();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_update_user_ignores_other_fields() {
        let req: UpdateUserRequest =
            serde_json::from_str(r#"{"username":"mallory","is_active":false}"#).unwrap();

        assert!(req.validate().is_ok());
        assert!(req.email.is_none() && req.password.is_none());
    }
}
