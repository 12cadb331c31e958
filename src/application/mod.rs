//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and business rules. Services consume repository traits and provide
//! a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Link CRUD and dense ordering
//! - [`services::profile_service::ProfileService`] - Profiles, avatars and social links
//! - [`services::user_service::UserService`] - Registration and credential checks
//! - [`services::auth_service::AuthService`] - JWT sessions with refresh rotation

pub mod services;
