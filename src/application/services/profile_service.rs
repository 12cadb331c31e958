//! Profile reads and updates, including avatar uploads and social links.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::entities::{Profile, ProfilePatch, SocialLinks, normalize_identifier};
use crate::domain::repositories::ProfileRepository;
use crate::error::AppError;
use crate::infrastructure::storage::AvatarStore;
use crate::utils::url_normalizer::normalize_url;

/// Largest accepted avatar upload.
pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

/// Limits on the social links mapping.
pub const MAX_SOCIAL_LINKS: usize = 20;
pub const MAX_SOCIAL_KEY_LEN: usize = 32;

/// File extension for an accepted avatar content type.
pub fn avatar_extension(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Service for profiles.
pub struct ProfileService<P: ProfileRepository> {
    profile_repository: Arc<P>,
    avatars: Arc<dyn AvatarStore>,
}

fn profile_not_found(user_id: Uuid) -> AppError {
    AppError::not_found("Profile not found", json!({ "user_id": user_id }))
}

impl<P: ProfileRepository> ProfileService<P> {
    /// Creates a new profile service.
    pub fn new(profile_repository: Arc<P>, avatars: Arc<dyn AvatarStore>) -> Self {
        Self {
            profile_repository,
            avatars,
        }
    }

    /// Loads the profile of a user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user has no profile.
    pub async fn get_by_user_id(&self, user_id: Uuid) -> Result<Profile, AppError> {
        self.profile_repository
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| profile_not_found(user_id))
    }

    /// Loads a public profile by its owner's username.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no such profile exists or it is private.
    pub async fn get_public_by_username(&self, username: &str) -> Result<Profile, AppError> {
        let normalized = normalize_identifier(username);

        self.profile_repository
            .find_by_username(&normalized)
            .await?
            .filter(|p| p.is_public)
            .ok_or_else(|| {
                AppError::not_found("Profile not found", json!({ "username": normalized }))
            })
    }

    /// Merges the given fields into the profile.
    ///
    /// An empty patch returns the profile unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user has no profile.
    pub async fn update(&self, user_id: Uuid, patch: ProfilePatch) -> Result<Profile, AppError> {
        if patch.is_empty() {
            return self.get_by_user_id(user_id).await;
        }

        self.profile_repository.update(user_id, patch).await
    }

    /// Stores a new avatar image and points the profile at it.
    ///
    /// The content type and size are checked before anything is written. The
    /// previous uploaded avatar is removed afterwards; failing to remove it
    /// only logs a warning.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a non-image content type or an empty file.
    /// Returns [`AppError::PayloadTooLarge`] above [`MAX_AVATAR_BYTES`].
    /// Returns [`AppError::NotFound`] if the user has no profile.
    /// Returns [`AppError::Internal`] if the file cannot be stored.
    pub async fn replace_avatar(
        &self,
        user_id: Uuid,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Profile, AppError> {
        let extension = avatar_extension(content_type).ok_or_else(|| {
            AppError::bad_request(
                "Only JPEG, PNG, GIF and WebP images are allowed",
                json!({ "content_type": content_type }),
            )
        })?;

        if bytes.is_empty() {
            return Err(AppError::bad_request(
                "Avatar file is empty",
                json!({ "field": "file" }),
            ));
        }
        if bytes.len() > MAX_AVATAR_BYTES {
            return Err(AppError::payload_too_large(
                "Avatar exceeds the 5 MiB limit",
                json!({ "max_bytes": MAX_AVATAR_BYTES, "size": bytes.len() }),
            ));
        }

        let previous = self.get_by_user_id(user_id).await?.avatar_url;
        let size = bytes.len();
        let avatar_url = self.avatars.save(extension, bytes).await?;

        let profile = match self
            .profile_repository
            .set_avatar_url(user_id, &avatar_url)
            .await
        {
            Ok(profile) => profile,
            Err(e) => {
                if let Err(cleanup) = self.avatars.delete(&avatar_url).await {
                    warn!(
                        error = %cleanup,
                        avatar_url = %avatar_url,
                        "Failed to remove orphaned avatar"
                    );
                }
                return Err(e);
            }
        };

        if let Some(old) = previous.filter(|old| self.avatars.manages(old) && *old != avatar_url)
            && let Err(e) = self.avatars.delete(&old).await
        {
            warn!(error = %e, avatar_url = %old, "Failed to remove previous avatar");
        }

        metrics::counter!("avatar_uploads_total").increment(1);
        info!(user_id = %user_id, size, avatar_url = %avatar_url, "avatar_replaced");

        Ok(profile)
    }

    /// Replaces the social links mapping.
    ///
    /// Keys are trimmed; values are normalized http(s) URLs.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if there are more than
    /// [`MAX_SOCIAL_LINKS`] entries, a key is empty or longer than
    /// [`MAX_SOCIAL_KEY_LEN`], or a value is not an http(s) URL.
    /// Returns [`AppError::NotFound`] if the user has no profile.
    pub async fn update_social_links(
        &self,
        user_id: Uuid,
        social_links: SocialLinks,
    ) -> Result<Profile, AppError> {
        let social_links = validate_social_links(social_links)?;
        self.profile_repository
            .set_social_links(user_id, social_links)
            .await
    }
}

fn validate_social_links(input: SocialLinks) -> Result<SocialLinks, AppError> {
    if input.len() > MAX_SOCIAL_LINKS {
        return Err(AppError::bad_request(
            format!("At most {MAX_SOCIAL_LINKS} social links are allowed"),
            json!({ "count": input.len() }),
        ));
    }

    let mut normalized = SocialLinks::new();
    for (key, url) in input {
        let key = key.trim().to_string();
        if key.is_empty() || key.chars().count() > MAX_SOCIAL_KEY_LEN {
            return Err(AppError::bad_request(
                format!("Social link names must be 1 to {MAX_SOCIAL_KEY_LEN} characters"),
                json!({ "key": key }),
            ));
        }

        let url = normalize_url(&url).map_err(|e| {
            AppError::bad_request(e.to_string(), json!({ "key": key }))
        })?;
        normalized.insert(key, url);
    }

    Ok(normalized)
}
