//! Unit of Work pattern implementation.
//!
//! The Unit of Work:
//! - Centralizes access to all repositories
//! - Manages database transactions (begin, commit, rollback)
//! - Runs multi-table writes (products with their pivots, shops with
//!   their address) atomically

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use std::sync::Arc;
use uuid::Uuid;

use super::repositories::{
    address_repository, product_repository, shop_repository, AddressRepository, AddressStore,
    BrandRepository, BrandStore, CategoryRepository, CategoryStore, CompositionRepository,
    CompositionStore, DeviceRepository, DeviceStore, OtpRepository, OtpStore, ProductRepository,
    ProductStore, RegionRepository, RegionStore, SellerRepository, SellerStore, ShopRepository,
    ShopStore, UserRepository, UserStore,
};
use crate::domain::{
    Address, AddressInput, AddressOwner, CompositionLink, NewProduct, NewShop, Product,
    ProductChanges, ProductImage, Shop,
};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Unit of Work trait for dependency injection.
///
/// Provides centralized access to all repositories and transaction management.
/// Note: This trait is not mockable directly due to generic methods.
/// For testing, implement it over mocked repositories.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;
    fn sellers(&self) -> Arc<dyn SellerRepository>;
    fn otps(&self) -> Arc<dyn OtpRepository>;
    fn regions(&self) -> Arc<dyn RegionRepository>;
    fn addresses(&self) -> Arc<dyn AddressRepository>;
    fn shops(&self) -> Arc<dyn ShopRepository>;
    fn categories(&self) -> Arc<dyn CategoryRepository>;
    fn brands(&self) -> Arc<dyn BrandRepository>;
    fn compositions(&self) -> Arc<dyn CompositionRepository>;
    fn products(&self) -> Arc<dyn ProductRepository>;
    fn devices(&self) -> Arc<dyn DeviceRepository>;

    /// Execute a closure within a transaction.
    ///
    /// The transaction is automatically committed on success or rolled back on error.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;
}

/// Product writes that take part in a transaction.
///
/// Product rows, brand links, composition pivots and image rows are
/// written together or not at all.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProductWriter: Send + Sync {
    async fn create(&self, product: NewProduct) -> AppResult<Product>;

    async fn update(&self, id: Uuid, changes: ProductChanges) -> AppResult<Product>;

    /// Delete the product and return its stored image paths
    async fn delete(&self, id: Uuid) -> AppResult<Vec<String>>;

    /// Replace the brand links
    async fn set_brands(&self, product_id: Uuid, brand_ids: Vec<Uuid>) -> AppResult<()>;

    /// Replace the composition pivots
    async fn set_compositions(&self, product_id: Uuid, links: Vec<CompositionLink>)
        -> AppResult<()>;

    /// Append images in the given order after any existing ones
    async fn add_images(&self, product_id: Uuid, paths: Vec<String>)
        -> AppResult<Vec<ProductImage>>;
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ShopWriter: Send + Sync {
    async fn create(&self, shop: NewShop) -> AppResult<Shop>;
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AddressWriter: Send + Sync {
    async fn upsert(&self, owner: AddressOwner, input: AddressInput) -> AppResult<Address>;
}

/// Transaction context providing repository access within a transaction.
///
/// All repository operations performed through this context are part
/// of the same database transaction.
pub struct TransactionContext<'a> {
    products: &'a dyn ProductWriter,
    shops: &'a dyn ShopWriter,
    addresses: &'a dyn AddressWriter,
}

impl<'a> TransactionContext<'a> {
    pub fn new(
        products: &'a dyn ProductWriter,
        shops: &'a dyn ShopWriter,
        addresses: &'a dyn AddressWriter,
    ) -> Self {
        Self {
            products,
            shops,
            addresses,
        }
    }

    pub fn products(&self) -> &'a dyn ProductWriter {
        self.products
    }

    pub fn shops(&self) -> &'a dyn ShopWriter {
        self.shops
    }

    pub fn addresses(&self) -> &'a dyn AddressWriter {
        self.addresses
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    seller_repo: Arc<SellerStore>,
    otp_repo: Arc<OtpStore>,
    region_repo: Arc<RegionStore>,
    address_repo: Arc<AddressStore>,
    shop_repo: Arc<ShopStore>,
    category_repo: Arc<CategoryStore>,
    brand_repo: Arc<BrandStore>,
    composition_repo: Arc<CompositionStore>,
    product_repo: Arc<ProductStore>,
    device_repo: Arc<DeviceStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            seller_repo: Arc::new(SellerStore::new(db.clone())),
            otp_repo: Arc::new(OtpStore::new(db.clone())),
            region_repo: Arc::new(RegionStore::new(db.clone())),
            address_repo: Arc::new(AddressStore::new(db.clone())),
            shop_repo: Arc::new(ShopStore::new(db.clone())),
            category_repo: Arc::new(CategoryStore::new(db.clone())),
            brand_repo: Arc::new(BrandStore::new(db.clone())),
            composition_repo: Arc::new(CompositionStore::new(db.clone())),
            product_repo: Arc::new(ProductStore::new(db.clone())),
            device_repo: Arc::new(DeviceStore::new(db.clone())),
            db,
        }
    }

    async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.db.begin().await.map_err(AppError::from)
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn sellers(&self) -> Arc<dyn SellerRepository> {
        self.seller_repo.clone()
    }

    fn otps(&self) -> Arc<dyn OtpRepository> {
        self.otp_repo.clone()
    }

    fn regions(&self) -> Arc<dyn RegionRepository> {
        self.region_repo.clone()
    }

    fn addresses(&self) -> Arc<dyn AddressRepository> {
        self.address_repo.clone()
    }

    fn shops(&self) -> Arc<dyn ShopRepository> {
        self.shop_repo.clone()
    }

    fn categories(&self) -> Arc<dyn CategoryRepository> {
        self.category_repo.clone()
    }

    fn brands(&self) -> Arc<dyn BrandRepository> {
        self.brand_repo.clone()
    }

    fn compositions(&self) -> Arc<dyn CompositionRepository> {
        self.composition_repo.clone()
    }

    fn products(&self) -> Arc<dyn ProductRepository> {
        self.product_repo.clone()
    }

    fn devices(&self) -> Arc<dyn DeviceRepository> {
        self.device_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        let txn = self.begin().await?;
        let products = TxProductRepository { txn: &txn };
        let shops = TxShopRepository { txn: &txn };
        let addresses = TxAddressRepository { txn: &txn };

        let result = f(TransactionContext::new(&products, &shops, &addresses)).await;

        match result {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Product writer bound to an open transaction
pub struct TxProductRepository<'a> {
    txn: &'a DatabaseTransaction,
}

#[async_trait]
impl<'a> ProductWriter for TxProductRepository<'a> {
    async fn create(&self, product: NewProduct) -> AppResult<Product> {
        product_repository::insert(self.txn, product).await
    }

    async fn update(&self, id: Uuid, changes: ProductChanges) -> AppResult<Product> {
        product_repository::update(self.txn, id, changes).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<Vec<String>> {
        product_repository::delete(self.txn, id).await
    }

    async fn set_brands(&self, product_id: Uuid, brand_ids: Vec<Uuid>) -> AppResult<()> {
        product_repository::set_brands(self.txn, product_id, brand_ids).await
    }

    async fn set_compositions(
        &self,
        product_id: Uuid,
        links: Vec<CompositionLink>,
    ) -> AppResult<()> {
        product_repository::set_compositions(self.txn, product_id, links).await
    }

    async fn add_images(
        &self,
        product_id: Uuid,
        paths: Vec<String>,
    ) -> AppResult<Vec<ProductImage>> {
        let start = product_repository::next_image_position(self.txn, product_id).await?;
        let mut images = Vec::with_capacity(paths.len());
        for (offset, path) in paths.into_iter().enumerate() {
            let position = start + offset as i32;
            images.push(product_repository::insert_image(self.txn, product_id, path, position).await?);
        }
        Ok(images)
    }
}

/// Shop writer bound to an open transaction
pub struct TxShopRepository<'a> {
    txn: &'a DatabaseTransaction,
}

#[async_trait]
impl<'a> ShopWriter for TxShopRepository<'a> {
    async fn create(&self, shop: NewShop) -> AppResult<Shop> {
        shop_repository::insert(self.txn, shop).await
    }
}

/// Address writer bound to an open transaction
pub struct TxAddressRepository<'a> {
    txn: &'a DatabaseTransaction,
}

#[async_trait]
impl<'a> AddressWriter for TxAddressRepository<'a> {
    async fn upsert(&self, owner: AddressOwner, input: AddressInput) -> AppResult<Address> {
        address_repository::upsert(self.txn, owner, input).await
    }
}
