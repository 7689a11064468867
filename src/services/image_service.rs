//! Stores inline and uploaded images through the configured storage.

use std::sync::Arc;

use crate::domain::{ImageSource, InlineImage};
use crate::errors::AppResult;
use crate::infra::FileStorage;

/// Image helper shared by every service that keeps a picture.
#[derive(Clone)]
pub struct ImageService {
    storage: Arc<dyn FileStorage>,
    max_bytes: usize,
}

impl ImageService {
    pub fn new(storage: Arc<dyn FileStorage>, max_bytes: usize) -> Self {
        Self { storage, max_bytes }
    }

    /// Decode a base64 / data URI payload and store it.
    pub async fn store_inline(&self, folder: &str, slug: &str, data: &str) -> AppResult<String> {
        let image = InlineImage::decode(data, self.max_bytes)?;
        self.storage.put(folder, slug, image).await
    }

    /// Store raw bytes from a multipart upload.
    pub async fn store_bytes(&self, folder: &str, slug: &str, bytes: Vec<u8>) -> AppResult<String> {
        let image = InlineImage::from_bytes(bytes, self.max_bytes)?;
        self.storage.put(folder, slug, image).await
    }

    pub async fn store(&self, folder: &str, slug: &str, source: ImageSource) -> AppResult<String> {
        match source {
            ImageSource::Bytes(bytes) => self.store_bytes(folder, slug, bytes).await,
            ImageSource::Inline(data) => self.store_inline(folder, slug, &data).await,
        }
    }

    /// Store an optional inline image, `None` when nothing was sent.
    pub async fn store_optional(
        &self,
        folder: &str,
        slug: &str,
        data: Option<&str>,
    ) -> AppResult<Option<String>> {
        match data {
            Some(data) => self.store_inline(folder, slug, data).await.map(Some),
            None => Ok(None),
        }
    }

    /// Best-effort removal; failures are logged, never returned.
    pub async fn discard(&self, path: Option<&str>) {
        let Some(path) = path else { return };
        if let Err(e) = self.storage.delete(path).await {
            tracing::warn!(path, error = %e, "Failed to remove stored image");
        }
    }

    pub async fn discard_all(&self, paths: &[String]) {
        for path in paths {
            self.discard(Some(path)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::infra::MockFileStorage;
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

    const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00";

    #[tokio::test]
    async fn test_store_inline_writes_through_storage() {
        let mut storage = MockFileStorage::new();
        storage
            .expect_put()
            .withf(|folder, slug, image| folder == "brands" && slug == "acme" && image.bytes == GIF)
            .returning(|_, _, _| Ok("/storage/brands/acme/x.gif".to_string()));

        let images = ImageService::new(Arc::new(storage), 1024);
        let path = images
            .store_inline("brands", "acme", &BASE64.encode(GIF))
            .await
            .unwrap();
        assert_eq!(path, "/storage/brands/acme/x.gif");
    }

    #[tokio::test]
    async fn test_invalid_payload_never_reaches_storage() {
        let mut storage = MockFileStorage::new();
        storage.expect_put().never();

        let images = ImageService::new(Arc::new(storage), 1024);
        let result = images.store_inline("brands", "acme", "not base64!").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_discard_swallows_errors() {
        let mut storage = MockFileStorage::new();
        storage
            .expect_delete()
            .times(1)
            .returning(|_| Err(AppError::internal("disk gone")));

        let images = ImageService::new(Arc::new(storage), 1024);
        images.discard(Some("/storage/a.png")).await;
        images.discard(None).await;
    }
}
