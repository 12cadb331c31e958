//! DTOs for link endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::api::dto::not_blank;
use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::error::AppError;

const MAX_DESCRIPTION_LEN: usize = 500;

/// Request body for `POST /links`.
///
/// There is no position field; a new link always goes last.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be 1 to 100 characters"))]
    #[validate(custom(function = "not_blank"))]
    pub title: String,

    #[validate(length(min = 1, max = 2048, message = "URL must be 1 to 2048 characters"))]
    pub url: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    #[serde(default = "default_active", alias = "isActive")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl From<CreateLinkRequest> for NewLink {
    fn from(req: CreateLinkRequest) -> Self {
        NewLink {
            title: req.title.trim().to_string(),
            url: req.url,
            description: req.description.filter(|d| !d.trim().is_empty()),
            is_active: req.is_active,
        }
    }
}

/// Request body for `PATCH /links/{id}`.
///
/// All fields are optional and only provided fields are changed.
/// `description: null` clears the description. An `order` field, if sent,
/// is ignored.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLinkRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be 1 to 100 characters"))]
    #[validate(custom(function = "not_blank"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 2048, message = "URL must be 1 to 2048 characters"))]
    pub url: Option<String>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,

    #[serde(alias = "isActive")]
    pub is_active: Option<bool>,
}

impl UpdateLinkRequest {
    /// Converts into a patch, checking the description length.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the description is too long.
    pub fn into_patch(self) -> Result<LinkPatch, AppError> {
        if let Some(Some(ref d)) = self.description
            && d.chars().count() > MAX_DESCRIPTION_LEN
        {
            return Err(AppError::bad_request(
                "Validation failed",
                json!({ "description": ["Description must be at most 500 characters"] }),
            ));
        }

        Ok(LinkPatch {
            title: self.title.map(|t| t.trim().to_string()),
            url: self.url,
            description: self.description,
            is_active: self.is_active,
        })
    }
}

/// One entry of a reorder payload, `{ "id": ..., "order": ... }`.
///
/// The rank is the entry's index in the list; any `order` value is skipped.
#[derive(Debug, Deserialize)]
pub struct ReorderItem {
    pub id: Uuid,
}

/// Request body for `PATCH /links/reorder`.
#[derive(Debug, Deserialize)]
pub struct ReorderLinksRequest {
    pub links: Vec<ReorderItem>,
}

impl ReorderLinksRequest {
    /// Link ids in requested display order.
    pub fn into_ids(self) -> Vec<Uuid> {
        self.links.into_iter().map(|item| item.id).collect()
    }
}

/// A link as returned by the API.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub order: i32,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        Self {
            id: link.id,
            user_id: link.user_id,
            title: link.title,
            url: link.url,
            description: link.description,
            is_active: link.is_active,
            order: link.position,
            click_count: link.click_count,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

/// Converts a list of links, keeping their order.
pub fn link_list(links: Vec<Link>) -> Vec<LinkResponse> {
    links.into_iter().map(LinkResponse::from).collect()
}
