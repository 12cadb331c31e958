//! DTOs for profile endpoints.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::LazyLock;
use uuid::Uuid;
use validator::Validate;

use crate::api::dto::not_blank;
use crate::domain::entities::{Profile, ProfilePatch, SocialLinks};
use crate::error::AppError;

static HEX_COLOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap());

/// Request body for `PATCH /profiles/me`.
///
/// Only these fields can change; anything else in the body is ignored.
/// `bio: null` clears the bio.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[serde(alias = "displayName")]
    #[validate(length(min = 1, max = 50, message = "Display name must be 1 to 50 characters"))]
    #[validate(custom(function = "not_blank"))]
    pub display_name: Option<String>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub bio: Option<Option<String>>,

    #[serde(alias = "accentColor")]
    #[validate(regex(path = "*HEX_COLOR_REGEX", message = "Accent color must look like #rrggbb"))]
    pub accent_color: Option<String>,

    #[serde(alias = "isPublic")]
    pub is_public: Option<bool>,
}

const MAX_BIO_LEN: usize = 500;

impl UpdateProfileRequest {
    /// Converts into a patch, checking the bio length.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the bio is too long.
    pub fn into_patch(self) -> Result<ProfilePatch, AppError> {
        if let Some(Some(ref b)) = self.bio
            && b.chars().count() > MAX_BIO_LEN
        {
            return Err(AppError::bad_request(
                "Validation failed",
                json!({ "bio": ["Bio must be at most 500 characters"] }),
            ));
        }

        Ok(ProfilePatch {
            display_name: self.display_name.map(|n| n.trim().to_string()),
            bio: self.bio,
            accent_color: self.accent_color.map(|c| c.to_ascii_lowercase()),
            is_public: self.is_public,
        })
    }
}

/// Request body for `PATCH /profiles/me/social-links`.
#[derive(Debug, Deserialize)]
pub struct UpdateSocialLinksRequest {
    #[serde(alias = "socialLinks")]
    pub social_links: SocialLinks,
}

/// A profile as returned by the API.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub accent_color: String,
    pub is_public: bool,
    pub social_links: SocialLinks,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Profile> for ProfileResponse {
    fn from(p: Profile) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            username: p.username,
            display_name: p.display_name,
            bio: p.bio,
            avatar_url: p.avatar_url,
            accent_color: p.accent_color,
            is_public: p.is_public,
            social_links: p.social_links,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}
