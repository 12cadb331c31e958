//! Repository trait for user profiles.

use crate::domain::entities::{Profile, ProfilePatch, SocialLinks};
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository interface for reading and updating profiles.
///
/// Profiles are created with their user (see
/// [`crate::domain::repositories::UserRepository::create_with_profile`]) and
/// deleted by cascade, so there is no create or delete here.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgProfileRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Finds the profile owned by a user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Profile>, AppError>;

    /// Finds a profile through its owner's normalized username.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_username(&self, username: &str) -> Result<Option<Profile>, AppError>;

    /// Applies a whitelisted partial update.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user has no profile.
    /// Returns [`AppError::Internal`] on database errors.
    async fn update(&self, user_id: Uuid, patch: ProfilePatch) -> Result<Profile, AppError>;

    /// Replaces the avatar reference.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user has no profile.
    /// Returns [`AppError::Internal`] on database errors.
    async fn set_avatar_url(&self, user_id: Uuid, avatar_url: &str) -> Result<Profile, AppError>;

    /// Replaces the social links mapping wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user has no profile.
    /// Returns [`AppError::Internal`] on database errors.
    async fn set_social_links(
        &self,
        user_id: Uuid,
        social_links: SocialLinks,
    ) -> Result<Profile, AppError>;
}
