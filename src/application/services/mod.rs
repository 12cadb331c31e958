//! Business logic services for the application layer.

pub mod auth_service;
pub mod link_service;
pub mod profile_service;
pub mod user_service;

pub use auth_service::{AuthService, AuthUser, SessionTokens};
pub use link_service::{LinkPage, LinkService};
pub use profile_service::ProfileService;
pub use user_service::UserService;
