//! File storage collaborator used by the form engine for `image` fields.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Extensions accepted for uploaded images.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Public URL prefix under which stored files are served.
pub const PUBLIC_PREFIX: &str = "/static/uploads";

/// Raw file content received for an image field.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Persist the upload and return the reference to record as the field value.
    async fn store(&self, upload: &Upload) -> Result<String>;

    /// Delete a previously stored file. Used to undo stores when the
    /// enclosing submission is rolled back.
    async fn remove(&self, reference: &str) -> Result<()>;
}

/// Lower-cased extension of an acceptable upload, or a validation error.
pub fn check_upload(upload: &Upload) -> Result<String> {
    let ext = Path::new(&upload.file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| {
            Error::validation(format!("File '{}' has no extension", upload.file_name))
        })?;

    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(Error::validation(format!(
            "File type '.{ext}' is not allowed (expected one of: {})",
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }
    Ok(ext)
}

/// Stores uploads in a local directory under random names.
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a public reference back to a path inside `root`. Rejects anything
    /// that is not a bare file name under the public prefix.
    fn resolve(&self, reference: &str) -> Result<PathBuf> {
        let name = reference
            .strip_prefix(PUBLIC_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| !name.is_empty() && !name.contains(['/', '\\']) && *name != "..")
            .ok_or_else(|| Error::validation(format!("Not a stored file reference: {reference}")))?;
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn store(&self, upload: &Upload) -> Result<String> {
        let ext = check_upload(upload)?;
        let file_name = format!("{}.{ext}", Uuid::new_v4().simple());

        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&file_name), &upload.bytes).await?;

        tracing::debug!(file = %file_name, bytes = upload.bytes.len(), "stored upload");
        Ok(format!("{PUBLIC_PREFIX}/{file_name}"))
    }

    async fn remove(&self, reference: &str) -> Result<()> {
        let path = self.resolve(reference)?;
        tokio::fs::remove_file(path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, bytes: &[u8]) -> Upload {
        Upload {
            file_name: name.to_string(),
            content_type: Some("image/png".to_string()),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn test_check_upload_accepts_known_extensions() {
        assert_eq!(check_upload(&upload("photo.PNG", b"x")).unwrap(), "png");
        assert_eq!(check_upload(&upload("a.b.webp", b"x")).unwrap(), "webp");
    }

    #[test]
    fn test_check_upload_rejects_other_extensions() {
        assert!(matches!(
            check_upload(&upload("script.exe", b"x")),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            check_upload(&upload("noext", b"x")),
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_store_writes_file_and_returns_public_reference() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path().join("uploads"));

        let reference = store.store(&upload("shoe.jpg", b"jpeg-bytes")).await.unwrap();
        assert!(reference.starts_with("/static/uploads/"));
        assert!(reference.ends_with(".jpg"));

        let name = reference.rsplit('/').next().unwrap();
        let on_disk = std::fs::read(store.root().join(name)).unwrap();
        assert_eq!(on_disk, b"jpeg-bytes");
    }

    #[tokio::test]
    async fn test_two_stores_use_distinct_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        let a = store.store(&upload("a.png", b"1")).await.unwrap();
        let b = store.store(&upload("a.png", b"2")).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_remove_deletes_stored_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        let reference = store.store(&upload("a.gif", b"gif")).await.unwrap();

        store.remove(&reference).await.unwrap();

        let name = reference.rsplit('/').next().unwrap();
        assert!(!dir.path().join(name).exists());
    }

    #[tokio::test]
    async fn test_remove_rejects_paths_outside_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        let err = store.remove("/static/uploads/../secret").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        let err = store.remove("/etc/passwd").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
