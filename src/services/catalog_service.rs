//! Catalog service - Brands and compositions attached to products.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::ImageService;
use crate::config::FOLDER_BRANDS;
use crate::domain::{
    Brand, BrandChanges, Composition, CompositionChanges, NewBrand, NewComposition,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};
use crate::utils::slug_or;

#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn list_brands(&self, params: PaginationParams) -> AppResult<Paginated<Brand>>;

    async fn get_brand(&self, id: Uuid) -> AppResult<Brand>;

    async fn create_brand(&self, brand: NewBrand, image: Option<String>) -> AppResult<Brand>;

    async fn update_brand(
        &self,
        id: Uuid,
        changes: BrandChanges,
        image: Option<String>,
    ) -> AppResult<Brand>;

    /// Product links go with the brand
    async fn delete_brand(&self, id: Uuid) -> AppResult<()>;

    async fn list_compositions(&self, params: PaginationParams)
        -> AppResult<Paginated<Composition>>;

    async fn get_composition(&self, id: Uuid) -> AppResult<Composition>;

    async fn create_composition(&self, composition: NewComposition) -> AppResult<Composition>;

    async fn update_composition(
        &self,
        id: Uuid,
        changes: CompositionChanges,
    ) -> AppResult<Composition>;

    async fn delete_composition(&self, id: Uuid) -> AppResult<()>;
}

pub struct CatalogManager<U: UnitOfWork> {
    uow: Arc<U>,
    images: ImageService,
}

impl<U: UnitOfWork> CatalogManager<U> {
    pub fn new(uow: Arc<U>, images: ImageService) -> Self {
        Self { uow, images }
    }

    async fn check_brand_slug(&self, slug: &str, except: Option<Uuid>) -> AppResult<()> {
        if self.uow.brands().slug_taken(slug, except).await? {
            Err(AppError::field("slug", "The slug has already been taken."))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> CatalogService for CatalogManager<U> {
    async fn list_brands(&self, params: PaginationParams) -> AppResult<Paginated<Brand>> {
        let (brands, total) = self.uow.brands().list(params.clone()).await?;
        Ok(Paginated::from_page(brands, &params, total))
    }

    async fn get_brand(&self, id: Uuid) -> AppResult<Brand> {
        self.uow.brands().find_by_id(id).await?.ok_or_not_found()
    }

    async fn create_brand(&self, mut brand: NewBrand, image: Option<String>) -> AppResult<Brand> {
        brand.slug = slug_or(Some(&brand.slug), &brand.name);
        self.check_brand_slug(&brand.slug, None).await?;

        brand.image = self
            .images
            .store_optional(FOLDER_BRANDS, &brand.slug, image.as_deref())
            .await?;
        let stored = brand.image.clone();

        match self.uow.brands().create(brand).await {
            Ok(brand) => {
                tracing::info!(brand_id = %brand.id, "Brand created");
                Ok(brand)
            }
            Err(e) => {
                self.images.discard(stored.as_deref()).await;
                Err(e)
            }
        }
    }

    async fn update_brand(
        &self,
        id: Uuid,
        mut changes: BrandChanges,
        image: Option<String>,
    ) -> AppResult<Brand> {
        let current = self.get_brand(id).await?;

        if let Some(slug) = changes.slug.take() {
            let name = changes.name.as_deref().unwrap_or(&current.name);
            let slug = slug_or(Some(&slug), name);
            self.check_brand_slug(&slug, Some(id)).await?;
            changes.slug = Some(slug);
        }

        let folder_slug = changes.slug.as_deref().unwrap_or(&current.slug).to_string();
        changes.image = self
            .images
            .store_optional(FOLDER_BRANDS, &folder_slug, image.as_deref())
            .await?;
        let stored = changes.image.clone();

        match self.uow.brands().update(id, changes).await {
            Ok(brand) => {
                if stored.is_some() {
                    self.images.discard(current.image.as_deref()).await;
                }
                Ok(brand)
            }
            Err(e) => {
                self.images.discard(stored.as_deref()).await;
                Err(e)
            }
        }
    }

    async fn delete_brand(&self, id: Uuid) -> AppResult<()> {
        let brand = self.get_brand(id).await?;
        self.uow.brands().delete(id).await?;
        self.images.discard(brand.image.as_deref()).await;
        tracing::info!(brand_id = %id, "Brand deleted");
        Ok(())
    }

    async fn list_compositions(
        &self,
        params: PaginationParams,
    ) -> AppResult<Paginated<Composition>> {
        let (compositions, total) = self.uow.compositions().list(params.clone()).await?;
        Ok(Paginated::from_page(compositions, &params, total))
    }

    async fn get_composition(&self, id: Uuid) -> AppResult<Composition> {
        self.uow.compositions().find_by_id(id).await?.ok_or_not_found()
    }

    async fn create_composition(&self, composition: NewComposition) -> AppResult<Composition> {
        self.uow.compositions().create(composition).await
    }

    async fn update_composition(
        &self,
        id: Uuid,
        changes: CompositionChanges,
    ) -> AppResult<Composition> {
        self.uow.compositions().update(id, changes).await
    }

    async fn delete_composition(&self, id: Uuid) -> AppResult<()> {
        self.uow.compositions().delete(id).await?;
        tracing::info!(composition_id = %id, "Composition deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{MockBrandRepository, MockCompositionRepository, MockFileStorage};
    use crate::services::testing::TestUow;
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use chrono::Utc;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

    fn brand(id: Uuid, image: Option<&str>) -> Brand {
        Brand {
            id,
            name: "Nestle".to_string(),
            slug: "nestle".to_string(),
            image: image.map(str::to_string),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn manager(uow: TestUow, storage: MockFileStorage) -> CatalogManager<TestUow> {
        CatalogManager::new(Arc::new(uow), ImageService::new(Arc::new(storage), 1024))
    }

    #[tokio::test]
    async fn test_brand_image_replaced_after_update() {
        let mut brands = MockBrandRepository::new();
        brands
            .expect_find_by_id()
            .returning(|id| Ok(Some(brand(id, Some("/storage/brands/nestle/old.png")))));
        brands.expect_update().returning(|id, changes| {
            let mut updated = brand(id, None);
            updated.image = changes.image;
            Ok(updated)
        });

        let mut storage = MockFileStorage::new();
        storage
            .expect_put()
            .withf(|folder, slug, _| folder == FOLDER_BRANDS && slug == "nestle")
            .returning(|_, _, _| Ok("/storage/brands/nestle/new.png".to_string()));
        storage
            .expect_delete()
            .withf(|path| path == "/storage/brands/nestle/old.png")
            .times(1)
            .returning(|_| Ok(()));

        let uow = TestUow {
            brands: Arc::new(brands),
            ..Default::default()
        };
        let updated = manager(uow, storage)
            .update_brand(Uuid::new_v4(), BrandChanges::default(), Some(BASE64.encode(PNG)))
            .await
            .unwrap();
        assert_eq!(updated.image.as_deref(), Some("/storage/brands/nestle/new.png"));
    }

    #[tokio::test]
    async fn test_failed_create_discards_new_image() {
        let mut brands = MockBrandRepository::new();
        brands.expect_slug_taken().returning(|_, _| Ok(false));
        brands
            .expect_create()
            .returning(|_| Err(AppError::conflict("Resource already exists")));

        let mut storage = MockFileStorage::new();
        storage
            .expect_put()
            .returning(|_, _, _| Ok("/storage/brands/nestle/new.png".to_string()));
        storage
            .expect_delete()
            .withf(|path| path == "/storage/brands/nestle/new.png")
            .times(1)
            .returning(|_| Ok(()));

        let uow = TestUow {
            brands: Arc::new(brands),
            ..Default::default()
        };
        let new = NewBrand {
            name: "Nestle".to_string(),
            slug: String::new(),
            image: None,
        };
        let result = manager(uow, storage)
            .create_brand(new, Some(BASE64.encode(PNG)))
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_missing_composition_is_not_found() {
        let mut compositions = MockCompositionRepository::new();
        compositions.expect_find_by_id().returning(|_| Ok(None));

        let uow = TestUow {
            compositions: Arc::new(compositions),
            ..Default::default()
        };
        let result = manager(uow, MockFileStorage::new())
            .get_composition(Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }
}
