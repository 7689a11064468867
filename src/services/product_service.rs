//! Product service - Products with their brands, compositions and images.
//!
//! Multi-table writes run inside a unit-of-work transaction. Image files
//! are written before the transaction and removed again when it fails;
//! files of deleted rows are removed only after commit.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use super::container::parallel;
use super::ImageService;
use crate::config::FOLDER_PRODUCTS;
use crate::domain::{
    Actor, CompositionLink, ImageSource, Pricing, Product, ProductCompositionResponse,
    ProductDraft, ProductFilter, ProductImage, ProductPatch, ProductResponse, Shop,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};
use crate::utils::slug_or;

#[async_trait]
pub trait ProductService: Send + Sync {
    async fn list_products(
        &self,
        filter: ProductFilter,
        params: PaginationParams,
    ) -> AppResult<Paginated<Product>>;

    /// Product with category, shop, brands, compositions and images
    async fn get_product(&self, id: Uuid) -> AppResult<ProductResponse>;

    async fn create_product(&self, actor: Actor, draft: ProductDraft)
        -> AppResult<ProductResponse>;

    async fn update_product(
        &self,
        actor: Actor,
        id: Uuid,
        patch: ProductPatch,
    ) -> AppResult<ProductResponse>;

    async fn delete_product(&self, actor: Actor, id: Uuid) -> AppResult<()>;

    /// Append one image after the existing ones
    async fn add_image(
        &self,
        actor: Actor,
        id: Uuid,
        source: ImageSource,
    ) -> AppResult<ProductImage>;

    async fn remove_image(&self, actor: Actor, id: Uuid, image_id: Uuid) -> AppResult<()>;
}

pub struct ProductManager<U: UnitOfWork> {
    uow: Arc<U>,
    images: ImageService,
}

impl<U: UnitOfWork> ProductManager<U> {
    pub fn new(uow: Arc<U>, images: ImageService) -> Self {
        Self { uow, images }
    }

    async fn find(&self, id: Uuid) -> AppResult<Product> {
        self.uow.products().find_by_id(id).await?.ok_or_not_found()
    }

    fn authorize(actor: &Actor, shop: &Shop) -> AppResult<()> {
        if actor.is_self_or_admin(shop.user_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    /// Load a product whose shop the caller may manage.
    async fn find_owned(&self, actor: &Actor, id: Uuid) -> AppResult<Product> {
        let product = self.find(id).await?;
        let shop = self
            .uow
            .shops()
            .find_by_id(product.shop_id)
            .await?
            .ok_or_not_found()?;
        Self::authorize(actor, &shop)?;
        Ok(product)
    }

    async fn check_category(&self, category_id: Uuid) -> AppResult<()> {
        match self.uow.categories().find_by_id(category_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::field("category_id", "The selected category is invalid.")),
        }
    }

    async fn check_slug(&self, slug: &str, except: Option<Uuid>) -> AppResult<()> {
        if self.uow.products().slug_taken(slug, except).await? {
            Err(AppError::field("slug", "The slug has already been taken."))
        } else {
            Ok(())
        }
    }

    /// Every id must name an existing brand. Duplicates collapse.
    async fn check_brands(&self, ids: Vec<Uuid>) -> AppResult<Vec<Uuid>> {
        let ids = dedup(ids);
        let found = self.uow.brands().find_many(ids.clone()).await?;
        if found.len() == ids.len() {
            Ok(ids)
        } else {
            Err(AppError::field("brand_ids", "The selected brand is invalid."))
        }
    }

    async fn check_compositions(&self, links: &[CompositionLink]) -> AppResult<()> {
        if links.iter().any(|link| !link.qty.is_finite() || link.qty < 0.0) {
            return Err(AppError::field(
                "compositions",
                "Quantity must be a non-negative number.",
            ));
        }

        let ids: Vec<Uuid> = links.iter().map(|link| link.composition_id).collect();
        let unique = dedup(ids.clone());
        if unique.len() != ids.len() {
            return Err(AppError::field(
                "compositions",
                "A composition can be listed only once.",
            ));
        }

        let found = self.uow.compositions().find_many(unique.clone()).await?;
        if found.len() == unique.len() {
            Ok(())
        } else {
            Err(AppError::field(
                "compositions",
                "The selected composition is invalid.",
            ))
        }
    }

    /// Store every inline image; on failure the ones already stored are removed.
    async fn store_images(&self, slug: &str, images: Vec<String>) -> AppResult<Vec<String>> {
        let mut stored = Vec::with_capacity(images.len());
        for data in images {
            match self.images.store_inline(FOLDER_PRODUCTS, slug, &data).await {
                Ok(path) => stored.push(path),
                Err(e) => {
                    self.images.discard_all(&stored).await;
                    return Err(e);
                }
            }
        }
        Ok(stored)
    }
}

fn check_pricing(pricing: &Pricing) -> AppResult<()> {
    pricing
        .check()
        .map_err(|(field, message)| AppError::field(field, message))
}

fn dedup(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[async_trait]
impl<U: UnitOfWork> ProductService for ProductManager<U> {
    async fn list_products(
        &self,
        filter: ProductFilter,
        params: PaginationParams,
    ) -> AppResult<Paginated<Product>> {
        let (products, total) = self.uow.products().list(filter, params.clone()).await?;
        Ok(Paginated::from_page(products, &params, total))
    }

    async fn get_product(&self, id: Uuid) -> AppResult<ProductResponse> {
        let product = self.find(id).await?;
        let products = self.uow.products();
        let categories = self.uow.categories();
        let shops = self.uow.shops();

        let (category, shop, brands, (compositions, images)) = parallel::join4(
            categories.find_by_id(product.category_id),
            shops.find_by_id(product.shop_id),
            products.brands_of(id),
            parallel::join2(products.compositions_of(id), products.images_of(id)),
        )
        .await?;

        let mut response = ProductResponse::from(product);
        response.category = category.map(Into::into);
        response.shop = shop.map(Into::into);
        response.brands = brands.into_iter().map(Into::into).collect();
        response.compositions = compositions
            .into_iter()
            .map(|(composition, link)| ProductCompositionResponse {
                composition: composition.into(),
                qty: link.qty,
                qty_type: link.qty_type,
            })
            .collect();
        response.images = images.into_iter().map(Into::into).collect();
        Ok(response)
    }

    async fn create_product(
        &self,
        actor: Actor,
        draft: ProductDraft,
    ) -> AppResult<ProductResponse> {
        let ProductDraft {
            mut product,
            brand_ids,
            compositions,
            images,
        } = draft;

        let shop = self
            .uow
            .shops()
            .find_by_id(product.shop_id)
            .await?
            .ok_or_else(|| AppError::field("shop_id", "The selected shop is invalid."))?;
        Self::authorize(&actor, &shop)?;

        check_pricing(&product.pricing)?;
        self.check_category(product.category_id).await?;
        let brand_ids = self.check_brands(brand_ids).await?;
        self.check_compositions(&compositions).await?;

        product.slug = slug_or(Some(&product.slug), &product.name_en);
        self.check_slug(&product.slug, None).await?;

        let stored = self.store_images(&product.slug, images).await?;
        let paths = stored.clone();

        let result = self
            .uow
            .transaction(|ctx| {
                Box::pin(async move {
                    let writer = ctx.products();
                    let product = writer.create(product).await?;
                    writer.set_brands(product.id, brand_ids).await?;
                    writer.set_compositions(product.id, compositions).await?;
                    writer.add_images(product.id, paths).await?;
                    Ok(product)
                })
            })
            .await;

        match result {
            Ok(product) => {
                tracing::info!(product_id = %product.id, shop_id = %product.shop_id, "Product created");
                self.get_product(product.id).await
            }
            Err(e) => {
                self.images.discard_all(&stored).await;
                Err(e)
            }
        }
    }

    async fn update_product(
        &self,
        actor: Actor,
        id: Uuid,
        patch: ProductPatch,
    ) -> AppResult<ProductResponse> {
        let current = self.find_owned(&actor, id).await?;
        let pricing = patch.merged_pricing(current.pricing);
        let ProductPatch {
            mut changes,
            brand_ids,
            compositions,
            images,
            ..
        } = patch;

        if let Some(pricing) = &pricing {
            check_pricing(pricing)?;
        }
        changes.pricing = pricing;

        if let Some(category_id) = changes.category_id {
            self.check_category(category_id).await?;
        }
        let brand_ids = match brand_ids {
            Some(ids) => Some(self.check_brands(ids).await?),
            None => None,
        };
        if let Some(links) = &compositions {
            self.check_compositions(links).await?;
        }

        if let Some(slug) = changes.slug.take() {
            let name = changes.name_en.as_deref().unwrap_or(&current.name_en);
            let slug = slug_or(Some(&slug), name);
            self.check_slug(&slug, Some(id)).await?;
            changes.slug = Some(slug);
        }

        let folder_slug = changes.slug.as_deref().unwrap_or(&current.slug).to_string();
        let stored = self.store_images(&folder_slug, images).await?;
        let paths = stored.clone();

        let result = self
            .uow
            .transaction(|ctx| {
                Box::pin(async move {
                    let writer = ctx.products();
                    writer.update(id, changes).await?;
                    if let Some(brand_ids) = brand_ids {
                        writer.set_brands(id, brand_ids).await?;
                    }
                    if let Some(links) = compositions {
                        writer.set_compositions(id, links).await?;
                    }
                    writer.add_images(id, paths).await?;
                    Ok(())
                })
            })
            .await;

        match result {
            Ok(()) => self.get_product(id).await,
            Err(e) => {
                self.images.discard_all(&stored).await;
                Err(e)
            }
        }
    }

    async fn delete_product(&self, actor: Actor, id: Uuid) -> AppResult<()> {
        self.find_owned(&actor, id).await?;

        let paths = self
            .uow
            .transaction(|ctx| Box::pin(async move { ctx.products().delete(id).await }))
            .await?;

        self.images.discard_all(&paths).await;
        tracing::info!(product_id = %id, images = paths.len(), "Product deleted");
        Ok(())
    }

    async fn add_image(
        &self,
        actor: Actor,
        id: Uuid,
        source: ImageSource,
    ) -> AppResult<ProductImage> {
        let product = self.find_owned(&actor, id).await?;
        let path = self.images.store(FOLDER_PRODUCTS, &product.slug, source).await?;

        match self.uow.products().add_image(id, path.clone()).await {
            Ok(image) => Ok(image),
            Err(e) => {
                self.images.discard(Some(&path)).await;
                Err(e)
            }
        }
    }

    async fn remove_image(&self, actor: Actor, id: Uuid, image_id: Uuid) -> AppResult<()> {
        self.find_owned(&actor, id).await?;
        let products = self.uow.products();
        let image = products.find_image(id, image_id).await?.ok_or_not_found()?;

        products.remove_image(image.id).await?;
        self.images.discard(Some(&image.path)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AccountKind, Brand, Category, Composition, NewProduct, ProductChanges, QtyType,
    };
    use crate::infra::{
        MockBrandRepository, MockCategoryRepository, MockCompositionRepository, MockFileStorage,
        MockProductRepository, MockShopRepository,
    };
    use crate::services::testing::TestUow;
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn shop(id: Uuid, user_id: Uuid) -> Shop {
        Shop {
            id,
            user_id,
            region_id: Uuid::new_v4(),
            name: "Gül Bazar".to_string(),
            slug: "gul-bazar".to_string(),
            description: None,
            phone: None,
            image: None,
            hours: None,
            status: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn product(id: Uuid, shop_id: Uuid) -> Product {
        Product {
            id,
            category_id: Uuid::new_v4(),
            shop_id,
            name_tm: "Alma şiresi".to_string(),
            name_en: "Apple juice".to_string(),
            name_ru: "Яблочный сок".to_string(),
            slug: "apple-juice".to_string(),
            description: None,
            pricing: Pricing {
                price: 1250,
                discount_price: None,
            },
            stock: 40,
            status: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn draft(shop_id: Uuid, pricing: Pricing) -> ProductDraft {
        ProductDraft {
            product: NewProduct {
                category_id: Uuid::new_v4(),
                shop_id,
                name_tm: "Alma şiresi".to_string(),
                name_en: "Apple juice".to_string(),
                name_ru: "Яблочный сок".to_string(),
                slug: String::new(),
                description: None,
                pricing,
                stock: 10,
                status: true,
            },
            brand_ids: Vec::new(),
            compositions: Vec::new(),
            images: Vec::new(),
        }
    }

    fn owner(id: Uuid) -> Actor {
        Actor {
            id,
            kind: AccountKind::User,
            admin: false,
        }
    }

    fn manager(uow: TestUow, storage: MockFileStorage) -> ProductManager<TestUow> {
        ProductManager::new(Arc::new(uow), ImageService::new(Arc::new(storage), 1024))
    }

    fn category(id: Uuid) -> Category {
        Category {
            id,
            category_id: None,
            name_tm: "Içgiler".to_string(),
            name_en: "Drinks".to_string(),
            name_ru: "Напитки".to_string(),
            slug: "drinks".to_string(),
            image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn brand(id: Uuid) -> Brand {
        Brand {
            id,
            name: "Nestle".to_string(),
            slug: format!("nestle-{}", id.simple()),
            image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn composition(id: Uuid) -> Composition {
        Composition {
            id,
            name_tm: "Şeker".to_string(),
            name_en: "Sugar".to_string(),
            name_ru: "Сахар".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Catalog lookups that accept every id they are asked about.
    fn known_catalog() -> (MockCategoryRepository, MockBrandRepository, MockCompositionRepository) {
        let mut categories = MockCategoryRepository::new();
        categories
            .expect_find_by_id()
            .returning(|id| Ok(Some(category(id))));
        let mut brands = MockBrandRepository::new();
        brands
            .expect_find_many()
            .returning(|ids| Ok(ids.into_iter().map(brand).collect()));
        let mut compositions = MockCompositionRepository::new();
        compositions
            .expect_find_many()
            .returning(|ids| Ok(ids.into_iter().map(composition).collect()));
        (categories, brands, compositions)
    }

    /// Product reads used when the saved product is loaded back.
    fn readable_products(shop_id: Uuid) -> MockProductRepository {
        let mut products = MockProductRepository::new();
        products.expect_slug_taken().returning(|_, _| Ok(false));
        products
            .expect_find_by_id()
            .returning(move |id| Ok(Some(product(id, shop_id))));
        products.expect_brands_of().returning(|_| Ok(Vec::new()));
        products.expect_compositions_of().returning(|_| Ok(Vec::new()));
        products.expect_images_of().returning(|_| Ok(Vec::new()));
        products
    }

    fn stored_from(new: NewProduct) -> Product {
        Product {
            id: Uuid::new_v4(),
            category_id: new.category_id,
            shop_id: new.shop_id,
            name_tm: new.name_tm,
            name_en: new.name_en,
            name_ru: new.name_ru,
            slug: new.slug,
            description: new.description,
            pricing: new.pricing,
            stock: new.stock,
            status: new.status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Storage that hands out numbered paths in upload order.
    fn numbered_storage() -> MockFileStorage {
        let counter = AtomicUsize::new(0);
        let mut storage = MockFileStorage::new();
        storage.expect_put().returning(move |_, slug, _| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            Ok(format!("/storage/products/{slug}/{n}.gif"))
        });
        storage
    }

    fn gif() -> String {
        BASE64.encode(b"GIF89a\x01\x00\x01\x00")
    }

    fn shops_owned_by(user_id: Uuid) -> MockShopRepository {
        let mut shops = MockShopRepository::new();
        shops
            .expect_find_by_id()
            .returning(move |id| Ok(Some(shop(id, user_id))));
        shops
    }

    #[tokio::test]
    async fn test_create_in_foreign_shop_is_forbidden() {
        let uow = TestUow {
            shops: Arc::new(shops_owned_by(Uuid::new_v4())),
            ..Default::default()
        };
        let pricing = Pricing {
            price: 100,
            discount_price: None,
        };
        let result = manager(uow, MockFileStorage::new())
            .create_product(owner(Uuid::new_v4()), draft(Uuid::new_v4(), pricing))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_create_rejects_discount_above_price() {
        let user_id = Uuid::new_v4();
        let uow = TestUow {
            shops: Arc::new(shops_owned_by(user_id)),
            ..Default::default()
        };
        let pricing = Pricing {
            price: 100,
            discount_price: Some(150),
        };
        let result = manager(uow, MockFileStorage::new())
            .create_product(owner(user_id), draft(Uuid::new_v4(), pricing))
            .await;
        match result {
            Err(AppError::InvalidFields(fields)) => assert!(fields.contains_key("discount_price")),
            other => panic!("unexpected: {:?}", other.map(|p| p.id)),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_brand() {
        let user_id = Uuid::new_v4();
        let mut categories = MockCategoryRepository::new();
        categories
            .expect_find_by_id()
            .returning(|id| Ok(Some(category(id))));
        let known = Uuid::new_v4();
        let mut brands = MockBrandRepository::new();
        brands
            .expect_find_many()
            .returning(move |_| Ok(vec![brand(known)]));

        let uow = TestUow {
            shops: Arc::new(shops_owned_by(user_id)),
            categories: Arc::new(categories),
            brands: Arc::new(brands),
            ..Default::default()
        };
        let mut input = draft(
            Uuid::new_v4(),
            Pricing {
                price: 100,
                discount_price: None,
            },
        );
        input.brand_ids = vec![known, Uuid::new_v4(), known];

        let result = manager(uow, MockFileStorage::new())
            .create_product(owner(user_id), input)
            .await;
        match result {
            Err(AppError::InvalidFields(fields)) => assert!(fields.contains_key("brand_ids")),
            other => panic!("unexpected: {:?}", other.map(|p| p.id)),
        }
    }

    #[tokio::test]
    async fn test_update_merges_price_before_checking() {
        let user_id = Uuid::new_v4();
        let mut products = MockProductRepository::new();
        products.expect_find_by_id().returning(|id| {
            let mut p = product(id, Uuid::new_v4());
            p.pricing = Pricing {
                price: 1000,
                discount_price: Some(900),
            };
            Ok(Some(p))
        });

        let uow = TestUow {
            shops: Arc::new(shops_owned_by(user_id)),
            products: Arc::new(products),
            ..Default::default()
        };
        // Dropping the price below the stored discount is refused
        let patch = ProductPatch {
            changes: ProductChanges::default(),
            price: Some(800),
            ..Default::default()
        };
        let result = manager(uow, MockFileStorage::new())
            .update_product(owner(user_id), Uuid::new_v4(), patch)
            .await;
        match result {
            Err(AppError::InvalidFields(fields)) => assert!(fields.contains_key("discount_price")),
            other => panic!("unexpected: {:?}", other.map(|p| p.id)),
        }
    }

    #[tokio::test]
    async fn test_add_image_stores_under_product_slug() {
        let user_id = Uuid::new_v4();
        let mut products = MockProductRepository::new();
        products
            .expect_find_by_id()
            .returning(|id| Ok(Some(product(id, Uuid::new_v4()))));
        products.expect_add_image().returning(|product_id, path| {
            Ok(ProductImage {
                id: Uuid::new_v4(),
                product_id,
                path,
                position: 3,
                created_at: Utc::now(),
            })
        });

        let mut storage = MockFileStorage::new();
        storage
            .expect_put()
            .withf(|folder, slug, _| folder == FOLDER_PRODUCTS && slug == "apple-juice")
            .returning(|_, _, _| Ok("/storage/products/apple-juice/a.png".to_string()));

        let uow = TestUow {
            shops: Arc::new(shops_owned_by(user_id)),
            products: Arc::new(products),
            ..Default::default()
        };
        let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0];
        let image = manager(uow, storage)
            .add_image(owner(user_id), Uuid::new_v4(), ImageSource::Bytes(png))
            .await
            .unwrap();
        assert_eq!(image.path, "/storage/products/apple-juice/a.png");
        assert_eq!(image.position, 3);
    }

    #[tokio::test]
    async fn test_remove_unknown_image_is_not_found() {
        let user_id = Uuid::new_v4();
        let mut products = MockProductRepository::new();
        products
            .expect_find_by_id()
            .returning(|id| Ok(Some(product(id, Uuid::new_v4()))));
        products.expect_find_image().returning(|_, _| Ok(None));
        products.expect_remove_image().never();

        let uow = TestUow {
            shops: Arc::new(shops_owned_by(user_id)),
            products: Arc::new(products),
            ..Default::default()
        };
        let result = manager(uow, MockFileStorage::new())
            .remove_image(owner(user_id), Uuid::new_v4(), Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_create_writes_links_and_images_in_one_transaction() {
        let user_id = Uuid::new_v4();
        let shop_id = Uuid::new_v4();
        let (categories, brands, compositions) = known_catalog();
        let first_brand = Uuid::new_v4();
        let second_brand = Uuid::new_v4();
        let sugar = Uuid::new_v4();

        let mut uow = TestUow {
            shops: Arc::new(shops_owned_by(user_id)),
            products: Arc::new(readable_products(shop_id)),
            categories: Arc::new(categories),
            brands: Arc::new(brands),
            compositions: Arc::new(compositions),
            ..Default::default()
        };
        uow.tx_products
            .expect_create()
            .withf(|new| new.slug == "apple-juice")
            .times(1)
            .returning(|new| Ok(stored_from(new)));
        uow.tx_products
            .expect_set_brands()
            .withf(move |_, ids| ids == &vec![first_brand, second_brand])
            .times(1)
            .returning(|_, _| Ok(()));
        uow.tx_products
            .expect_set_compositions()
            .withf(move |_, links| links.len() == 1 && links[0].composition_id == sugar)
            .times(1)
            .returning(|_, _| Ok(()));
        uow.tx_products
            .expect_add_images()
            .withf(|_, paths| {
                paths
                    == &vec![
                        "/storage/products/apple-juice/0.gif".to_string(),
                        "/storage/products/apple-juice/1.gif".to_string(),
                    ]
            })
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let mut input = draft(
            shop_id,
            Pricing {
                price: 1250,
                discount_price: Some(1000),
            },
        );
        input.brand_ids = vec![first_brand, second_brand, first_brand];
        input.compositions = vec![CompositionLink {
            composition_id: sugar,
            qty: 12.5,
            qty_type: QtyType::Gram,
        }];
        input.images = vec![gif(), gif()];

        let created = manager(uow, numbered_storage())
            .create_product(owner(user_id), input)
            .await
            .unwrap();
        assert_eq!(created.shop_id, shop_id);
        assert_eq!(created.category.map(|c| c.slug), Some("drinks".to_string()));
    }

    #[tokio::test]
    async fn test_failed_create_discards_stored_images() {
        let user_id = Uuid::new_v4();
        let shop_id = Uuid::new_v4();
        let (categories, brands, compositions) = known_catalog();

        let mut uow = TestUow {
            shops: Arc::new(shops_owned_by(user_id)),
            products: Arc::new(readable_products(shop_id)),
            categories: Arc::new(categories),
            brands: Arc::new(brands),
            compositions: Arc::new(compositions),
            ..Default::default()
        };
        uow.tx_products
            .expect_create()
            .returning(|new| Ok(stored_from(new)));
        uow.tx_products.expect_set_brands().returning(|_, _| Ok(()));
        uow.tx_products
            .expect_set_compositions()
            .returning(|_, _| Ok(()));
        uow.tx_products
            .expect_add_images()
            .returning(|_, _| Err(AppError::internal("disk full")));

        let removed = Arc::new(Mutex::new(Vec::new()));
        let seen = removed.clone();
        let mut storage = numbered_storage();
        storage.expect_delete().returning(move |url| {
            seen.lock().unwrap().push(url.to_string());
            Ok(())
        });

        let mut input = draft(
            shop_id,
            Pricing {
                price: 100,
                discount_price: None,
            },
        );
        input.images = vec![gif(), gif()];

        let result = manager(uow, storage)
            .create_product(owner(user_id), input)
            .await;
        assert!(matches!(result, Err(AppError::Internal(_))));
        assert_eq!(
            *removed.lock().unwrap(),
            vec![
                "/storage/products/apple-juice/0.gif".to_string(),
                "/storage/products/apple-juice/1.gif".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_update_replaces_brands_and_keeps_compositions() {
        let user_id = Uuid::new_v4();
        let shop_id = Uuid::new_v4();
        let (categories, brands, compositions) = known_catalog();
        let replacement = Uuid::new_v4();

        let mut uow = TestUow {
            shops: Arc::new(shops_owned_by(user_id)),
            products: Arc::new(readable_products(shop_id)),
            categories: Arc::new(categories),
            brands: Arc::new(brands),
            compositions: Arc::new(compositions),
            ..Default::default()
        };
        uow.tx_products
            .expect_update()
            .withf(|_, changes| changes.stock == Some(5))
            .times(1)
            .returning(|id, _| Ok(product(id, Uuid::new_v4())));
        uow.tx_products
            .expect_set_brands()
            .withf(move |_, ids| ids == &vec![replacement])
            .times(1)
            .returning(|_, _| Ok(()));
        uow.tx_products.expect_set_compositions().never();
        uow.tx_products
            .expect_add_images()
            .withf(|_, paths| paths.is_empty())
            .returning(|_, _| Ok(Vec::new()));

        let patch = ProductPatch {
            changes: ProductChanges {
                stock: Some(5),
                ..Default::default()
            },
            brand_ids: Some(vec![replacement]),
            ..Default::default()
        };
        let updated = manager(uow, MockFileStorage::new())
            .update_product(owner(user_id), Uuid::new_v4(), patch)
            .await
            .unwrap();
        assert_eq!(updated.shop_id, shop_id);
    }

    #[tokio::test]
    async fn test_delete_removes_files_after_commit() {
        let user_id = Uuid::new_v4();
        let mut products = MockProductRepository::new();
        products
            .expect_find_by_id()
            .returning(|id| Ok(Some(product(id, Uuid::new_v4()))));

        let mut uow = TestUow {
            shops: Arc::new(shops_owned_by(user_id)),
            products: Arc::new(products),
            ..Default::default()
        };
        uow.tx_products.expect_delete().times(1).returning(|_| {
            Ok(vec![
                "/storage/products/apple-juice/0.gif".to_string(),
                "/storage/products/apple-juice/1.gif".to_string(),
            ])
        });

        let mut storage = MockFileStorage::new();
        storage
            .expect_delete()
            .withf(|url| url.starts_with("/storage/products/apple-juice/"))
            .times(2)
            .returning(|_| Ok(()));

        manager(uow, storage)
            .delete_product(owner(user_id), Uuid::new_v4())
            .await
            .unwrap();
    }
}
