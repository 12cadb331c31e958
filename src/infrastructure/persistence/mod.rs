//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx runtime
//! queries mapped through `FromRow` row structs.
//!
//! # Repositories
//!
//! - [`PgUserRepository`] - Accounts and refresh token state
//! - [`PgProfileRepository`] - Profiles joined with their owner's username
//! - [`PgLinkRepository`] - Links and transactional dense ordering

pub mod pg_link_repository;
pub mod pg_profile_repository;
pub mod pg_user_repository;

pub use pg_link_repository::PgLinkRepository;
pub use pg_profile_repository::PgProfileRepository;
pub use pg_user_repository::PgUserRepository;
