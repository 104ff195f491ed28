//! Driven port for storing uploaded images.
use async_trait::async_trait;

use crate::domain::StoredImagePath;

use super::define_port_error;

define_port_error! {
    /// Errors raised by image store adapters.
    pub enum ImageStoreError {
        /// The path escaped the upload root or was otherwise unusable.
        InvalidPath { path: String } => "invalid image path: {path}",
        /// No file exists at the path.
        NotFound { path: String } => "image not found: {path}",
        /// Reading or writing the file failed.
        Io { message: String } => "image store I/O failed: {message}",
    }
}

/// Blob storage keyed by [`StoredImagePath`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist image bytes at `path`, creating parent directories.
    async fn save(&self, path: &StoredImagePath, bytes: &[u8]) -> Result<(), ImageStoreError>;

    /// Read image bytes from `path`.
    async fn load(&self, path: &StoredImagePath) -> Result<Vec<u8>, ImageStoreError>;

    /// Delete the file at `path`. Removing a missing file succeeds.
    async fn remove(&self, path: &StoredImagePath) -> Result<(), ImageStoreError>;
}
