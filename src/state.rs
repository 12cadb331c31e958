//! Shared application state injected into handlers.

use sqlx::PgPool;
use std::sync::Arc;

use crate::application::services::{AuthService, LinkService, ProfileService, UserService};
use crate::config::JwtConfig;
use crate::infrastructure::persistence::{PgLinkRepository, PgProfileRepository, PgUserRepository};
use crate::infrastructure::storage::AvatarStore;

/// Services wired to their PostgreSQL repositories.
///
/// Cheap to clone; every field is an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<PgPool>,
    pub user_service: Arc<UserService<PgUserRepository>>,
    pub auth_service: Arc<AuthService<PgUserRepository>>,
    pub link_service: Arc<LinkService<PgLinkRepository, PgProfileRepository>>,
    pub profile_service: Arc<ProfileService<PgProfileRepository>>,
    pub avatars: Arc<dyn AvatarStore>,
}

impl AppState {
    /// Builds repositories and services over one connection pool.
    pub fn new(pool: Arc<PgPool>, jwt: JwtConfig, avatars: Arc<dyn AvatarStore>) -> Self {
        let user_repository = Arc::new(PgUserRepository::new(pool.clone()));
        let profile_repository = Arc::new(PgProfileRepository::new(pool.clone()));
        let link_repository = Arc::new(PgLinkRepository::new(pool.clone()));

        Self {
            db: pool,
            user_service: Arc::new(UserService::new(user_repository.clone())),
            auth_service: Arc::new(AuthService::new(user_repository, jwt)),
            link_service: Arc::new(LinkService::new(
                link_repository,
                profile_repository.clone(),
            )),
            profile_service: Arc::new(ProfileService::new(profile_repository, avatars.clone())),
            avatars,
        }
    }
}
