//! Link management and the dense ordering of a user's links.

use std::sync::Arc;

use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::domain::repositories::{LinkRepository, ProfileRepository};
use crate::error::AppError;
use crate::utils::url_normalizer::normalize_url;

/// A page of the owner's link list.
#[derive(Debug, Clone)]
pub struct LinkPage {
    pub links: Vec<Link>,
    pub total: i64,
}

/// Service for creating, ordering and retrieving links.
///
/// All owner operations take the caller's id explicitly and never touch
/// another user's links. Position changes happen only in [`Self::append`],
/// [`Self::remove`] and [`Self::reorder`].
pub struct LinkService<L: LinkRepository, P: ProfileRepository> {
    link_repository: Arc<L>,
    profile_repository: Arc<P>,
}

fn link_not_found(link_id: Uuid) -> AppError {
    AppError::not_found("Link not found", json!({ "link_id": link_id }))
}

impl<L: LinkRepository, P: ProfileRepository> LinkService<L, P> {
    /// Creates a new link service.
    pub fn new(link_repository: Arc<L>, profile_repository: Arc<P>) -> Self {
        Self {
            link_repository,
            profile_repository,
        }
    }

    /// Appends a link to the end of the user's list.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is not an http(s) URL.
    /// Returns [`AppError::NotFound`] if the user does not exist.
    pub async fn append(&self, user_id: Uuid, mut new_link: NewLink) -> Result<Link, AppError> {
        new_link.url = normalize_url(&new_link.url)?;

        let link = self.link_repository.append(user_id, new_link).await?;
        info!(user_id = %user_id, link_id = %link.id, position = link.position, "link_created");

        Ok(link)
    }

    /// Removes a link and closes the gap it leaves.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not belong to the user.
    pub async fn remove(&self, user_id: Uuid, link_id: Uuid) -> Result<(), AppError> {
        if !self.link_repository.remove(user_id, link_id).await? {
            return Err(link_not_found(link_id));
        }

        info!(user_id = %user_id, link_id = %link_id, "link_removed");
        Ok(())
    }

    /// Reorders the user's links to follow `ids`.
    ///
    /// Links left out of `ids` keep their relative order after the listed ones.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an empty list, a repeated id or an
    /// id that is not one of the user's links; positions stay unchanged.
    pub async fn reorder(&self, user_id: Uuid, ids: Vec<Uuid>) -> Result<Vec<Link>, AppError> {
        let requested = ids.len();
        let links = self.link_repository.reorder(user_id, ids).await?;

        info!(user_id = %user_id, requested, total = links.len(), "links_reordered");
        Ok(links)
    }

    /// All of the user's links in display order.
    pub async fn find_ordered(&self, user_id: Uuid) -> Result<Vec<Link>, AppError> {
        self.link_repository.find_ordered(user_id, false, None).await
    }

    /// One page of the user's links in display order, with the total count.
    pub async fn list_page(
        &self,
        user_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<LinkPage, AppError> {
        let links = self
            .link_repository
            .find_ordered(user_id, false, Some((offset, limit)))
            .await?;
        let total = self.link_repository.count(user_id).await?;

        Ok(LinkPage { links, total })
    }

    /// Active links of a user whose profile is public, in display order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user has no public profile.
    pub async fn find_public(&self, user_id: Uuid) -> Result<Vec<Link>, AppError> {
        let visible = self
            .profile_repository
            .find_by_user_id(user_id)
            .await?
            .is_some_and(|p| p.is_public);

        if !visible {
            return Err(AppError::not_found(
                "Profile not found",
                json!({ "user_id": user_id }),
            ));
        }

        self.link_repository.find_ordered(user_id, true, None).await
    }

    /// Loads one of the user's links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not belong to the user.
    pub async fn get(&self, user_id: Uuid, link_id: Uuid) -> Result<Link, AppError> {
        self.link_repository
            .find_by_id(user_id, link_id)
            .await?
            .ok_or_else(|| link_not_found(link_id))
    }

    /// Applies a partial update. The link keeps its position.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if a new URL is not an http(s) URL.
    /// Returns [`AppError::NotFound`] if the link does not belong to the user.
    pub async fn update(
        &self,
        user_id: Uuid,
        link_id: Uuid,
        mut patch: LinkPatch,
    ) -> Result<Link, AppError> {
        if let Some(url) = patch.url.take() {
            patch.url = Some(normalize_url(&url)?);
        }

        self.link_repository.update(user_id, link_id, patch).await
    }

    /// Counts a visit to an active link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link is missing or inactive.
    pub async fn record_click(&self, link_id: Uuid) -> Result<(), AppError> {
        if !self.link_repository.increment_click_count(link_id).await? {
            return Err(link_not_found(link_id));
        }

        metrics::counter!("link_clicks_total").increment(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Profile, SocialLinks};
    use crate::domain::repositories::{MockLinkRepository, MockProfileRepository};
    use chrono::Utc;
    use mockall::predicate::eq;

    fn sample_link(user_id: Uuid, position: i32) -> Link {
        let now = Utc::now();
        Link {
            id: Uuid::new_v4(),
            user_id,
            title: format!("Link {position}"),
            url: "https://example.com/".to_string(),
            description: None,
            is_active: true,
            position,
            click_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_profile(user_id: Uuid, is_public: bool) -> Profile {
        let now = Utc::now();
        Profile {
            id: Uuid::new_v4(),
            user_id,
            username: "alice".to_string(),
            display_name: "alice".to_string(),
            bio: None,
            avatar_url: None,
            accent_color: "#000000".to_string(),
            is_public,
            social_links: SocialLinks::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn service(
        links: MockLinkRepository,
        profiles: MockProfileRepository,
    ) -> LinkService<MockLinkRepository, MockProfileRepository> {
        LinkService::new(Arc::new(links), Arc::new(profiles))
    }

    #[tokio::test]
    async fn test_append_normalizes_url() {
        let user_id = Uuid::new_v4();
        let mut links = MockLinkRepository::new();

        links
            .expect_append()
            .withf(move |uid, link| *uid == user_id && link.url == "https://example.com/Docs")
            .times(1)
            .returning(|uid, _| Ok(sample_link(uid, 0)));

        let result = service(links, MockProfileRepository::new())
            .append(
                user_id,
                NewLink {
                    title: "Docs".to_string(),
                    url: "HTTPS://Example.com:443/Docs".to_string(),
                    description: None,
                    is_active: true,
                },
            )
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_append_rejects_script_url() {
        let mut links = MockLinkRepository::new();
        links.expect_append().never();

        let err = service(links, MockProfileRepository::new())
            .append(
                Uuid::new_v4(),
                NewLink {
                    title: "x".to_string(),
                    url: "javascript:alert(1)".to_string(),
                    description: None,
                    is_active: true,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_remove_foreign_link_is_not_found() {
        let mut links = MockLinkRepository::new();
        links.expect_remove().times(1).returning(|_, _| Ok(false));

        let err = service(links, MockProfileRepository::new())
            .remove(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_keeps_position_and_normalizes_url() {
        let user_id = Uuid::new_v4();
        let link_id = Uuid::new_v4();
        let mut links = MockLinkRepository::new();

        links
            .expect_update()
            .withf(move |uid, lid, patch| {
                *uid == user_id
                    && *lid == link_id
                    && patch.url.as_deref() == Some("https://example.org/")
            })
            .times(1)
            .returning(|uid, _, _| Ok(sample_link(uid, 3)));

        let link = service(links, MockProfileRepository::new())
            .update(
                user_id,
                link_id,
                LinkPatch {
                    url: Some("https://EXAMPLE.org".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(link.position, 3);
    }

    #[tokio::test]
    async fn test_find_public_requires_public_profile() {
        let user_id = Uuid::new_v4();
        let mut links = MockLinkRepository::new();
        let mut profiles = MockProfileRepository::new();

        profiles
            .expect_find_by_user_id()
            .returning(move |uid| Ok(Some(sample_profile(uid, false))));
        links.expect_find_ordered().never();

        let err = service(links, profiles)
            .find_public(user_id)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_find_public_lists_active_only() {
        let user_id = Uuid::new_v4();
        let mut links = MockLinkRepository::new();
        let mut profiles = MockProfileRepository::new();

        profiles
            .expect_find_by_user_id()
            .returning(move |uid| Ok(Some(sample_profile(uid, true))));
        links
            .expect_find_ordered()
            .with(eq(user_id), eq(true), eq(None))
            .times(1)
            .returning(|uid, _, _| Ok(vec![sample_link(uid, 0)]));

        let result = service(links, profiles).find_public(user_id).await.unwrap();

        assert_eq!(result.len(), 1);
    }

    #[tokio::test]
    async fn test_list_page_reports_total() {
        let user_id = Uuid::new_v4();
        let mut links = MockLinkRepository::new();

        links
            .expect_find_ordered()
            .with(eq(user_id), eq(false), eq(Some((10, 10))))
            .returning(|uid, _, _| Ok(vec![sample_link(uid, 10)]));
        links.expect_count().returning(|_| Ok(11));

        let page = service(links, MockProfileRepository::new())
            .list_page(user_id, 10, 10)
            .await
            .unwrap();

        assert_eq!(page.total, 11);
        assert_eq!(page.links[0].position, 10);
    }

    #[tokio::test]
    async fn test_record_click_inactive_link() {
        let mut links = MockLinkRepository::new();
        links
            .expect_increment_click_count()
            .times(1)
            .returning(|_| Ok(false));

        let err = service(links, MockProfileRepository::new())
            .record_click(Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }
}
