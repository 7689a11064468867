//! Public file storage for uploaded images.
//!
//! Files are stored under `{folder}/{slug}/{uuid}.{ext}` below the storage
//! root and addressed by their public URL (`{url_prefix}/{relative path}`).

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::Config;
use crate::domain::InlineImage;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Write an image and return its public URL.
    async fn put(&self, folder: &str, slug: &str, image: InlineImage) -> AppResult<String>;

    /// Remove a file by its public URL. Missing files are not an error.
    async fn delete(&self, url: &str) -> AppResult<()>;
}

/// Storage on the local disk, served statically by the HTTP layer
#[derive(Debug, Clone)]
pub struct LocalDisk {
    root: PathBuf,
    url_prefix: String,
}

impl LocalDisk {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.storage_root, &config.storage_url)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Map a public URL back to a path under the root.
    ///
    /// Returns `None` for foreign URLs and for anything escaping the root.
    fn resolve(&self, url: &str) -> Option<PathBuf> {
        let relative = url.strip_prefix(&self.url_prefix)?.trim_start_matches('/');
        let relative = Path::new(relative);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(relative))
    }
}

#[async_trait]
impl FileStorage for LocalDisk {
    async fn put(&self, folder: &str, slug: &str, image: InlineImage) -> AppResult<String> {
        let slug = if slug.is_empty() { "misc" } else { slug };
        let dir = self.root.join(folder).join(slug);
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = format!("{}.{}", Uuid::new_v4(), image.format.extension());
        tokio::fs::write(dir.join(&file_name), &image.bytes).await?;

        tracing::debug!(folder, slug, file = %file_name, "Stored image");
        Ok(format!("{}/{}/{}/{}", self.url_prefix, folder, slug, file_name))
    }

    async fn delete(&self, url: &str) -> AppResult<()> {
        let Some(path) = self.resolve(url) else {
            tracing::warn!(url, "Refusing to delete a file outside storage");
            return Ok(());
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::from(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ImageFormat;

    fn png() -> InlineImage {
        InlineImage {
            format: ImageFormat::Png,
            bytes: vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A],
        }
    }

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("market-storage-{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_put_then_delete() {
        let root = scratch_dir();
        let disk = LocalDisk::new(&root, "/storage/");

        let url = disk.put("products", "apple-juice", png()).await.unwrap();
        assert!(url.starts_with("/storage/products/apple-juice/"));
        assert!(url.ends_with(".png"));

        let path = disk.resolve(&url).unwrap();
        assert!(path.exists());

        disk.delete(&url).await.unwrap();
        assert!(!path.exists());
        // Second delete is a no-op
        disk.delete(&url).await.unwrap();

        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn test_resolve_rejects_traversal_and_foreign_urls() {
        let disk = LocalDisk::new("/srv/files", "/storage");
        assert!(disk.resolve("/storage/../etc/passwd").is_none());
        assert!(disk.resolve("https://cdn.example.com/a.png").is_none());
        assert_eq!(
            disk.resolve("/storage/shops/s/a.png"),
            Some(PathBuf::from("/srv/files/shops/s/a.png"))
        );
    }
}
