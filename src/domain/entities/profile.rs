//! Profile entity holding the public presentation of a user.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Avatar shown until the user uploads their own.
pub const DEFAULT_AVATAR_URL: &str = "/images/default-avatar.png";

/// Accent color assigned to new profiles.
pub const DEFAULT_ACCENT_COLOR: &str = "#000000";

/// Social network name mapped to a profile URL.
pub type SocialLinks = BTreeMap<String, String>;

/// A user's profile. Exactly one exists per user.
#[derive(Debug, Clone)]
pub struct Profile {
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

/// Input data for creating a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProfile {
    pub display_name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub accent_color: String,
    pub is_public: bool,
}

impl NewProfile {
    /// Profile created alongside registration: named after the user, public,
    /// with the default avatar.
    pub fn defaults_for(username: &str) -> Self {
        Self {
            display_name: username.to_string(),
            bio: None,
            avatar_url: Some(DEFAULT_AVATAR_URL.to_string()),
            accent_color: DEFAULT_ACCENT_COLOR.to_string(),
            is_public: true,
        }
    }
}

/// Partial update for a profile.
///
/// Only these fields can be changed through a profile update. `None` leaves a
/// field unchanged; `bio: Some(None)` clears the bio.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub bio: Option<Option<String>>,
    pub accent_color: Option<String>,
    pub is_public: Option<bool>,
}

impl ProfilePatch {
    /// Returns true if the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.bio.is_none()
            && self.accent_color.is_none()
            && self.is_public.is_none()
    }
}
