//! Repository trait for a user's ordered links.

use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository interface for managing links.
///
/// Every method is scoped by the owning user. Methods that change positions
/// (`append`, `remove`, `reorder`) run as one transaction holding the owner's
/// lock, so the list stays dense under concurrent requests. Position
/// arithmetic lives in [`crate::domain::ordering`].
///
/// Listing order is `position`, then `created_at`, then `id`.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_link.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Appends a link after the user's last one.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn append(&self, user_id: Uuid, new_link: NewLink) -> Result<Link, AppError>;

    /// Deletes a link and renumbers the rest of the list.
    ///
    /// Returns `Ok(false)` if no link with this id belongs to the user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn remove(&self, user_id: Uuid, link_id: Uuid) -> Result<bool, AppError>;

    /// Rewrites positions so `ids` come first, in the given order.
    ///
    /// Returns the full list in its new order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] naming the first id that does not belong
    /// to the user, or a repeated id; nothing is written in that case.
    /// Returns [`AppError::Internal`] on database errors.
    async fn reorder(&self, user_id: Uuid, ids: Vec<Uuid>) -> Result<Vec<Link>, AppError>;

    /// Lists the user's links in display order.
    ///
    /// # Arguments
    ///
    /// - `only_active` - restrict to links visible on the public page
    /// - `page` - optional `(offset, limit)` window
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_ordered(
        &self,
        user_id: Uuid,
        only_active: bool,
        page: Option<(i64, i64)>,
    ) -> Result<Vec<Link>, AppError>;

    /// Counts all of the user's links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count(&self, user_id: Uuid) -> Result<i64, AppError>;

    /// Finds one of the user's links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, user_id: Uuid, link_id: Uuid) -> Result<Option<Link>, AppError>;

    /// Partially updates one of the user's links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link with this id belongs to the user.
    /// Returns [`AppError::Internal`] on database errors.
    async fn update(&self, user_id: Uuid, link_id: Uuid, patch: LinkPatch)
    -> Result<Link, AppError>;

    /// Increments the click counter of an active link.
    ///
    /// Returns `Ok(false)` if the link does not exist or is inactive.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn increment_click_count(&self, link_id: Uuid) -> Result<bool, AppError>;
}
