//! Avatar store trait and error types.

use async_trait::async_trait;
use serde_json::json;

use crate::error::AppError;

/// Errors that can occur while storing or removing avatar files.
#[derive(Debug, thiserror::Error)]
pub enum AvatarStoreError {
    #[error("Avatar storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a managed avatar reference: {0}")]
    UnmanagedReference(String),
}

impl From<AvatarStoreError> for AppError {
    fn from(e: AvatarStoreError) -> Self {
        AppError::internal("Avatar storage error", json!({ "reason": e.to_string() }))
    }
}

/// Result type for avatar store operations.
pub type StoreResult<T> = Result<T, AvatarStoreError>;

/// Content store for uploaded avatar images.
///
/// Stored files are addressed by the public URL returned from
/// [`AvatarStore::save`]; that URL is what the profile row keeps.
///
/// # Implementations
///
/// - [`crate::infrastructure::storage::LocalAvatarStore`] - Files on local disk, served statically
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvatarStore: Send + Sync {
    /// Writes a new file and returns its public URL.
    ///
    /// The file name is generated; `extension` is appended without a dot.
    ///
    /// # Errors
    ///
    /// Returns [`AvatarStoreError::Io`] if the file cannot be written.
    async fn save(&self, extension: &str, bytes: Vec<u8>) -> StoreResult<String>;

    /// Deletes a file previously returned by [`AvatarStore::save`].
    ///
    /// Returns `Ok(false)` if the file was already gone.
    ///
    /// # Errors
    ///
    /// Returns [`AvatarStoreError::UnmanagedReference`] for URLs this store did
    /// not produce, such as the default avatar.
    async fn delete(&self, public_url: &str) -> StoreResult<bool>;

    /// Returns true if this store manages the given URL.
    fn manages(&self, public_url: &str) -> bool;

    /// Checks that the storage directory is writable.
    ///
    /// Used by health check endpoints to report storage status.
    async fn health_check(&self) -> bool;
}
