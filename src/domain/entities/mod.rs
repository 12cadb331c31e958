//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures without persistence or HTTP concerns.
//!
//! # Entity Types
//!
//! - [`User`] - An account, owner of one profile and many links
//! - [`Profile`] - Public presentation of a user
//! - [`Link`] - One entry of a user's ordered link list
//!
//! # Design Pattern
//!
//! Entities come with separate structs for creation and partial updates:
//! - `NewUser`, `NewProfile`, `NewLink` - For creating new records
//! - `UserPatch`, `ProfilePatch`, `LinkPatch` - For whitelisted partial updates

pub mod link;
pub mod profile;
pub mod user;

pub use link::{Link, LinkPatch, NewLink};
pub use profile::{NewProfile, Profile, ProfilePatch, SocialLinks};
pub use user::{NewUser, User, UserPatch, normalize_identifier};
