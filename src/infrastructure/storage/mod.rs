//! Storage for uploaded avatar images.
//!
//! Provides an [`AvatarStore`] trait with one implementation:
//! - [`LocalAvatarStore`] - Files in the upload directory, served under `/uploads`

mod local_store;
mod service;

pub use local_store::LocalAvatarStore;
pub use service::{AvatarStore, AvatarStoreError, StoreResult};

#[cfg(test)]
pub use service::MockAvatarStore;
