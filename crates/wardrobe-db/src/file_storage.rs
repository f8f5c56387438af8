//! Filesystem blob store for item images.
//!
//! Objects live under `{base_path}/{bucket}/{path}` and are served from
//! `{public_base_url}/{bucket}/{path}`. Writes go to a temp file first and
//! are renamed into place, so a reader never sees a partial image.
//!
//! ## Example
//!
//! ```rust,ignore
//! use wardrobe_db::FilesystemBackend;
//!
//! let store = FilesystemBackend::new("/var/lib/wardrobe/images", "https://cdn.example/images");
//! let url = store.upload("user/0194...png", &bytes).await?;
//! ```

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use wardrobe_core::{defaults, BlobStore, Error, Result};

/// Filesystem-backed [`BlobStore`].
#[derive(Debug, Clone)]
pub struct FilesystemBackend {
    base_path: PathBuf,
    public_base_url: String,
    bucket: String,
}

impl FilesystemBackend {
    /// Create a backend rooted at `base_path` using the default image bucket.
    pub fn new(base_path: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            bucket: defaults::IMAGE_BUCKET.to_string(),
        }
    }

    /// Use a different bucket directory.
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    /// Public URL for an object path.
    pub fn public_url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.public_base_url, self.bucket, path)
    }

    /// Map an object path to a file, rejecting anything that could escape
    /// the bucket directory.
    fn full_path(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let is_safe = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !is_safe {
            return Err(Error::InvalidInput(format!(
                "Invalid storage path: {:?}",
                path
            )));
        }
        Ok(self.base_path.join(&self.bucket).join(relative))
    }

    /// Read an object back.
    pub async fn read(&self, path: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.full_path(path)?).await?)
    }

    /// Check whether an object exists.
    pub async fn exists(&self, path: &str) -> Result<bool> {
        Ok(fs::try_exists(self.full_path(path)?).await?)
    }

    /// Write, read back and delete a probe file.
    ///
    /// Run at startup to catch permission errors and missing mounts early.
    pub async fn validate(&self) -> std::result::Result<(), String> {
        let test_dir = self.base_path.join(&self.bucket).join(".health-check");
        let test_file = test_dir.join("probe.bin");

        fs::create_dir_all(&test_dir)
            .await
            .map_err(|e| format!("create_dir_all({:?}): {}", test_dir, e))?;

        let data = b"wardrobe-storage-probe";
        fs::write(&test_file, data)
            .await
            .map_err(|e| format!("write({:?}): {}", test_file, e))?;

        let read_data = fs::read(&test_file)
            .await
            .map_err(|e| format!("read({:?}): {}", test_file, e))?;
        if read_data != data {
            return Err("read-back mismatch".to_string());
        }

        fs::remove_file(&test_file)
            .await
            .map_err(|e| format!("remove_file({:?}): {}", test_file, e))?;
        let _ = fs::remove_dir(&test_dir).await;

        Ok(())
    }
}

#[async_trait]
impl BlobStore for FilesystemBackend {
    async fn upload(&self, path: &str, data: &[u8]) -> Result<String> {
        let full_path = self.full_path(path)?;
        debug!(
            subsystem = "storage",
            component = "filesystem",
            op = "upload",
            storage_path = %path,
            size_bytes = data.len(),
            "Writing blob"
        );

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                warn!(parent = %parent.display(), error = %e, "file_storage: create_dir_all failed");
                e
            })?;
        }

        let temp_path = full_path.with_extension("tmp");
        if let Err(e) = write_then_rename(&temp_path, &full_path, data).await {
            warn!(
                temp_path = %temp_path.display(),
                to = %full_path.display(),
                error = %e,
                "file_storage: write failed, removing temp file"
            );
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        // rw-r--r--, never executable
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&full_path, std::fs::Permissions::from_mode(0o644)).await?;
        }

        info!(
            subsystem = "storage",
            component = "filesystem",
            op = "upload",
            storage_path = %path,
            content_hash = %compute_content_hash(data),
            "Blob stored"
        );
        Ok(self.public_url(path))
    }

    async fn remove(&self, path: &str) -> Result<()> {
        let full_path = self.full_path(path)?;
        if fs::try_exists(&full_path).await? {
            fs::remove_file(full_path).await?;
        }
        Ok(())
    }
}

async fn write_then_rename(temp_path: &Path, full_path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(temp_path).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(temp_path, full_path).await
}

/// BLAKE3 hash of `data` as `blake3:{hex}`.
pub fn compute_content_hash(data: &[u8]) -> String {
    format!("blake3:{}", blake3::hash(data).to_hex())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn backend(dir: &TempDir) -> FilesystemBackend {
        FilesystemBackend::new(dir.path(), "http://localhost:3000/images/")
    }

    #[tokio::test]
    async fn test_upload_returns_public_url_and_writes_file() {
        let dir = TempDir::new().unwrap();
        let store = backend(&dir);

        let url = store.upload("u1/shirt.png", b"png bytes").await.unwrap();
        assert_eq!(url, "http://localhost:3000/images/wardrobe/u1/shirt.png");

        let on_disk = dir.path().join("wardrobe").join("u1").join("shirt.png");
        assert_eq!(std::fs::read(on_disk).unwrap(), b"png bytes");
        assert_eq!(store.read("u1/shirt.png").await.unwrap(), b"png bytes");
    }

    #[tokio::test]
    async fn test_upload_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = backend(&dir);
        store.upload("u1/a.jpg", b"data").await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path().join("wardrobe").join("u1"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries, vec!["a.jpg".to_string()]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_rename_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = backend(&dir);
        let user_dir = dir.path().join("wardrobe").join("u1");
        // a non-empty directory where the blob should land makes the rename fail
        std::fs::create_dir_all(user_dir.join("a.jpg")).unwrap();
        std::fs::write(user_dir.join("a.jpg").join("keep"), b"x").unwrap();

        let err = store.upload("u1/a.jpg", b"data").await.unwrap_err();

        assert!(matches!(err, Error::Io(_)));
        assert!(!user_dir.join("a.tmp").exists());
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = backend(&dir);
        store.upload("u1/a.jpg", b"data").await.unwrap();

        store.remove("u1/a.jpg").await.unwrap();
        assert!(!store.exists("u1/a.jpg").await.unwrap());
        store.remove("u1/a.jpg").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_escaping_paths() {
        let dir = TempDir::new().unwrap();
        let store = backend(&dir);

        for path in ["../evil.png", "/etc/passwd", "u1/../../x", ""] {
            let err = store.upload(path, b"x").await.unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "path {:?}", path);
        }
    }

    #[tokio::test]
    async fn test_custom_bucket() {
        let dir = TempDir::new().unwrap();
        let store = backend(&dir).with_bucket("thumbs");
        let url = store.upload("a.png", b"x").await.unwrap();
        assert!(url.ends_with("/thumbs/a.png"));
        assert!(dir.path().join("thumbs").join("a.png").exists());
    }

    #[tokio::test]
    async fn test_validate_probe() {
        let dir = TempDir::new().unwrap();
        assert!(backend(&dir).validate().await.is_ok());
    }

    #[test]
    fn test_content_hash_format() {
        let hash = compute_content_hash(b"hello");
        assert!(hash.starts_with("blake3:"));
        assert_eq!(hash.len(), "blake3:".len() + 64);
        assert_eq!(hash, compute_content_hash(b"hello"));
    }
}
