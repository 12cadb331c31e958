//! Repository trait for user accounts and their session state.

use crate::domain::entities::{NewProfile, NewUser, User, UserPatch};
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository interface for managing users.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUserRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_user.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates a user together with its profile in a single transaction.
    ///
    /// Either both rows exist afterwards or neither does.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the username or email is already taken.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create_with_profile(
        &self,
        new_user: NewUser,
        profile: NewProfile,
    ) -> Result<User, AppError>;

    /// Finds a user by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Finds a user by normalized (lowercase) username.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Finds a user by normalized (lowercase) email.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Stores or clears the digest of the user's current refresh token.
    ///
    /// Returns `Ok(false)` if the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn set_refresh_token_hash(
        &self,
        id: Uuid,
        refresh_token_hash: Option<String>,
    ) -> Result<bool, AppError>;

    /// Applies an account update and returns the stored user.
    ///
    /// A new password hash clears the refresh token digest in the same
    /// statement. Returns `Ok(None)` if the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the new email is already taken.
    /// Returns [`AppError::Internal`] on database errors.
    async fn update(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>, AppError>;

    /// Deletes a user; the profile and links go with it.
    ///
    /// Returns `Ok(false)` if the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}
