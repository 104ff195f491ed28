//! Filesystem image store rooted at the upload folder.
//!
//! All access goes through a capability handle on the upload root, so stored
//! paths cannot reach outside it. Writes land in a temporary sibling first
//! and are renamed into place.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use uuid::Uuid;

use crate::domain::StoredImagePath;
use crate::domain::ports::{ImageStore, ImageStoreError};

/// File counts below the upload root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadUsage {
    /// Per-user directories.
    pub directories: u64,
    /// Stored image files.
    pub files: u64,
}

/// [`ImageStore`] backed by a directory on local disk.
#[derive(Clone)]
pub struct FsImageStore {
    root: Arc<Dir>,
    root_path: PathBuf,
}

impl FsImageStore {
    /// Open `root`, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the directory cannot be created or opened.
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root_path = root.into();
        Dir::create_ambient_dir_all(&root_path, ambient_authority())?;
        let dir = Dir::open_ambient_dir(&root_path, ambient_authority())?;
        Ok(Self {
            root: Arc::new(dir),
            root_path,
        })
    }

    /// Directory this store writes to.
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Count per-user directories and the files inside them.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the root cannot be listed.
    pub fn usage(&self) -> io::Result<UploadUsage> {
        let mut usage = UploadUsage::default();
        for entry in self.root.entries()? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            usage.directories += 1;
            let user_dir = entry.open_dir()?;
            for file in user_dir.entries()? {
                if file?.file_type()?.is_file() {
                    usage.files += 1;
                }
            }
        }
        Ok(usage)
    }
}

/// Check a stored path is a plain `/`-separated relative path.
fn validate_relative(path: &str) -> Result<PathBuf, ImageStoreError> {
    let invalid = || ImageStoreError::invalid_path(path);
    if path.is_empty() || path.starts_with('/') || path.contains('\\') {
        return Err(invalid());
    }
    let mut relative = PathBuf::new();
    for component in path.split('/') {
        if component.is_empty() || component == "." || component == ".." {
            return Err(invalid());
        }
        relative.push(component);
    }
    Ok(relative)
}

fn map_io_error(path: &str, error: io::Error) -> ImageStoreError {
    if error.kind() == io::ErrorKind::NotFound {
        ImageStoreError::not_found(path)
    } else {
        debug!(path, %error, "image store I/O failed");
        ImageStoreError::io(error.to_string())
    }
}

fn write_atomically(root: &Dir, relative: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = relative.parent().filter(|p| !p.as_os_str().is_empty()) {
        root.create_dir_all(parent)?;
    }
    let file_name = relative
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let staged = relative.with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4().simple()));
    root.write(&staged, bytes)?;
    root.rename(&staged, root, relative).inspect_err(|_| {
        let _cleanup = root.remove_file(&staged);
    })
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn save(&self, path: &StoredImagePath, bytes: &[u8]) -> Result<(), ImageStoreError> {
        let relative = validate_relative(path.relative_path())?;
        let root = Arc::clone(&self.root);
        let owned = bytes.to_vec();
        let display = path.relative_path().to_owned();

        tokio::task::spawn_blocking(move || write_atomically(&root, &relative, &owned))
            .await
            .map_err(|error| ImageStoreError::io(error.to_string()))?
            .map_err(|error| map_io_error(&display, error))
    }

    async fn load(&self, path: &StoredImagePath) -> Result<Vec<u8>, ImageStoreError> {
        let relative = validate_relative(path.relative_path())?;
        let root = Arc::clone(&self.root);
        let display = path.relative_path().to_owned();

        tokio::task::spawn_blocking(move || root.read(&relative))
            .await
            .map_err(|error| ImageStoreError::io(error.to_string()))?
            .map_err(|error| map_io_error(&display, error))
    }

    async fn remove(&self, path: &StoredImagePath) -> Result<(), ImageStoreError> {
        let relative = validate_relative(path.relative_path())?;
        let root = Arc::clone(&self.root);
        let display = path.relative_path().to_owned();

        let outcome = tokio::task::spawn_blocking(move || root.remove_file(&relative))
            .await
            .map_err(|error| ImageStoreError::io(error.to_string()))?;
        match outcome {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(map_io_error(&display, error)),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Coverage against a temporary upload root.
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn store() -> (TempDir, FsImageStore) {
        let dir = TempDir::new().expect("temp dir");
        let store = FsImageStore::open(dir.path().join("uploads")).expect("store opens");
        (dir, store)
    }

    #[rstest]
    #[case("")]
    #[case("/etc/passwd")]
    #[case("1/../../escape.png")]
    #[case("1//scan.png")]
    #[case("1\\scan.png")]
    #[case("./scan.png")]
    fn rejects_unsafe_paths(#[case] path: &str) {
        assert_eq!(
            validate_relative(path),
            Err(ImageStoreError::invalid_path(path))
        );
    }

    #[rstest]
    fn accepts_user_scoped_paths() {
        let relative = validate_relative("7/20240309_140507_000000_scan.png").expect("valid");
        assert_eq!(relative, Path::new("7").join("20240309_140507_000000_scan.png"));
    }

    #[tokio::test]
    async fn saves_and_loads_bytes() {
        let (_dir, store) = store();
        let path = StoredImagePath::from_stored("scan.png", "3/scan.png");

        store.save(&path, b"png-bytes").await.expect("save");
        let loaded = store.load(&path).await.expect("load");

        assert_eq!(loaded, b"png-bytes");
        assert_eq!(
            store.usage().expect("usage"),
            UploadUsage {
                directories: 1,
                files: 1
            }
        );
    }

    #[tokio::test]
    async fn missing_files_are_not_found() {
        let (_dir, store) = store();
        let path = StoredImagePath::from_stored("gone.png", "3/gone.png");
        let error = store.load(&path).await.expect_err("missing file");
        assert_eq!(error, ImageStoreError::not_found("3/gone.png"));
    }

    #[tokio::test]
    async fn removes_stored_files() {
        let (_dir, store) = store();
        let path = StoredImagePath::from_stored("scan.png", "3/scan.png");
        store.save(&path, b"png-bytes").await.expect("save");

        store.remove(&path).await.expect("remove");

        assert_eq!(
            store.load(&path).await.expect_err("file gone"),
            ImageStoreError::not_found("3/scan.png")
        );
        store.remove(&path).await.expect("second remove is a no-op");
    }

    #[tokio::test]
    async fn overwrites_leave_no_staging_files() {
        let (dir, store) = store();
        let path = StoredImagePath::from_stored("scan.png", "3/scan.png");
        store.save(&path, b"first").await.expect("first save");
        store.save(&path, b"second").await.expect("second save");

        let entries = std::fs::read_dir(dir.path().join("uploads").join("3"))
            .expect("user dir")
            .count();
        assert_eq!(entries, 1);
        assert_eq!(store.load(&path).await.expect("load"), b"second");
    }
}
