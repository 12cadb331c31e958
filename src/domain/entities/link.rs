//! Link entity representing one entry of a user's ordered link list.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A link owned by a user.
///
/// `position` is the link's rank in the owner's list. Across one user's links
/// the positions are always exactly `0..n`.
#[derive(Debug, Clone)]
pub struct Link {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub position: i32,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input data for appending a link.
///
/// There is no position here: a new link always goes to the end of the list.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub is_active: bool,
}

/// Partial update for an existing link.
///
/// `None` fields are left unchanged. `description: Some(None)` clears it.
/// Position is not patchable; links move only through a reorder.
#[derive(Debug, Clone, Default)]
pub struct LinkPatch {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
}
