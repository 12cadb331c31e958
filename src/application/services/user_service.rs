//! Account registration, credential checks and account removal.

use serde_json::json;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::entities::{NewProfile, NewUser, User, UserPatch, normalize_identifier};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;
use crate::utils::password::{hash_password, verify_dummy, verify_password};

/// Service for user accounts.
///
/// Usernames and emails are lowercased before every lookup and insert, so
/// both are unique regardless of case.
pub struct UserService<U: UserRepository> {
    users: Arc<U>,
}

impl<U: UserRepository> UserService<U> {
    /// Creates a new user service.
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }

    /// Registers a user and their default profile.
    ///
    /// Input format is checked by the request DTO; this only enforces
    /// uniqueness and stores an Argon2 hash of the password.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] naming `username` or `email` if taken,
    /// including when a concurrent registration wins the race.
    /// Returns [`AppError::Internal`] on hashing or database errors.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AppError> {
        let username = normalize_identifier(username);
        let email = normalize_identifier(email);

        if self.users.find_by_username(&username).await?.is_some() {
            return Err(AppError::conflict(
                "username is already taken",
                json!({ "field": "username" }),
            ));
        }
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict(
                "email is already taken",
                json!({ "field": "email" }),
            ));
        }

        let password_hash = hash_password(password)?;
        let profile = NewProfile::defaults_for(&username);

        let user = self
            .users
            .create_with_profile(
                NewUser {
                    username,
                    email,
                    password_hash,
                },
                profile,
            )
            .await?;

        metrics::counter!("users_registered_total").increment(1);
        info!(user_id = %user.id, username = %user.username, "user_registered");

        Ok(user)
    }

    /// Returns the user if the credentials match an active account.
    ///
    /// Unknown usernames, wrong passwords, inactive accounts and unreadable
    /// stored hashes all give `Ok(None)`. Every path runs one Argon2
    /// verification, unknown usernames against a dummy hash.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn validate_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, AppError> {
        let username = normalize_identifier(username);

        let Some(user) = self.users.find_by_username(&username).await? else {
            verify_dummy(password);
            return Ok(None);
        };

        let matches = verify_password(password, &user.password_hash);
        if !user.is_active || !matches {
            return Ok(None);
        }

        Ok(Some(user))
    }

    /// Loads a user by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user does not exist.
    pub async fn get_by_id(&self, id: Uuid) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found", json!({ "user_id": id })))
    }

    /// Loads an active user by username for public display.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no active user has this username.
    pub async fn get_public_by_username(&self, username: &str) -> Result<User, AppError> {
        let normalized = normalize_identifier(username);

        self.users
            .find_by_username(&normalized)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::not_found("User not found", json!({ "username": normalized })))
    }

    /// Changes the account's email and/or password.
    ///
    /// The email is normalized like at registration. A new password is stored
    /// as a fresh Argon2 hash and signs out the current refresh token. With
    /// neither field set the account is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] naming `email` if another account has it.
    /// Returns [`AppError::NotFound`] if the user does not exist.
    /// Returns [`AppError::Internal`] on hashing or database errors.
    pub async fn update(
        &self,
        id: Uuid,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<User, AppError> {
        let email = email.map(normalize_identifier);

        if let Some(ref email) = email
            && let Some(owner) = self.users.find_by_email(email).await?
            && owner.id != id
        {
            return Err(AppError::conflict(
                "email is already taken",
                json!({ "field": "email" }),
            ));
        }

        let patch = UserPatch {
            email,
            password_hash: password.map(hash_password).transpose()?,
        };
        if patch.is_empty() {
            return self.get_by_id(id).await;
        }

        let password_changed = patch.password_hash.is_some();
        let user = self
            .users
            .update(id, patch)
            .await?
            .ok_or_else(|| AppError::not_found("User not found", json!({ "user_id": id })))?;

        info!(user_id = %id, password_changed, "account_updated");
        Ok(user)
    }

    /// Deletes a user together with their profile and links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user does not exist.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.users.delete(id).await? {
            return Err(AppError::not_found("User not found", json!({ "user_id": id })));
        }

        info!(user_id = %id, "user_deleted");
        Ok(())
    }
}
