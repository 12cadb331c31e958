//! Avatar store backed by a local directory.

use super::service::{AvatarStore, AvatarStoreError, StoreResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Sub-directory of the upload root holding avatars.
const AVATAR_DIR: &str = "avatars";

/// Stores avatars as `<upload_dir>/avatars/<uuid>.<ext>`.
///
/// The upload root is served under `/uploads`, so a stored file is reachable
/// at `/uploads/avatars/<uuid>.<ext>`.
pub struct LocalAvatarStore {
    dir: PathBuf,
    url_prefix: String,
}

impl LocalAvatarStore {
    /// Creates a store rooted at `upload_dir`.
    pub fn new(upload_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: upload_dir.as_ref().join(AVATAR_DIR),
            url_prefix: format!("/uploads/{AVATAR_DIR}/"),
        }
    }

    /// File name inside the avatar directory, if `public_url` is one of ours.
    fn file_name<'a>(&self, public_url: &'a str) -> Option<&'a str> {
        let name = public_url.strip_prefix(self.url_prefix.as_str())?;
        let valid = !name.is_empty()
            && !name.contains('/')
            && !name.contains('\\')
            && !name.starts_with('.');
        valid.then_some(name)
    }
}

#[async_trait]
impl AvatarStore for LocalAvatarStore {
    async fn save(&self, extension: &str, bytes: Vec<u8>) -> StoreResult<String> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let name = format!("{}.{}", Uuid::new_v4(), extension);
        tokio::fs::write(self.dir.join(&name), bytes).await?;

        debug!(file = %name, "Avatar file written");
        Ok(format!("{}{}", self.url_prefix, name))
    }

    async fn delete(&self, public_url: &str) -> StoreResult<bool> {
        let name = self
            .file_name(public_url)
            .ok_or_else(|| AvatarStoreError::UnmanagedReference(public_url.to_string()))?;

        match tokio::fs::remove_file(self.dir.join(name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn manages(&self, public_url: &str) -> bool {
        self.file_name(public_url).is_some()
    }

    async fn health_check(&self) -> bool {
        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            warn!(error = %e, dir = %self.dir.display(), "Avatar directory unavailable");
            return false;
        }

        match tokio::fs::metadata(&self.dir).await {
            Ok(meta) => meta.is_dir() && !meta.permissions().readonly(),
            Err(_) => false,
        }
    }
}
