//! Unit of work over mocked repositories for service unit tests.
//!
//! Transactions run their closure directly against mocked writers, so a
//! test sees every write a service makes inside one.

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::AppResult;
use crate::infra::{
    AddressRepository, BrandRepository, CategoryRepository, CompositionRepository,
    DeviceRepository, MockAddressRepository, MockAddressWriter, MockBrandRepository,
    MockCategoryRepository, MockCompositionRepository, MockDeviceRepository, MockOtpRepository,
    MockProductRepository, MockProductWriter, MockRegionRepository, MockSellerRepository,
    MockShopRepository, MockShopWriter, MockUserRepository, OtpRepository, ProductRepository,
    RegionRepository, SellerRepository, ShopRepository, TransactionContext, UnitOfWork,
    UserRepository,
};

/// Every repository defaults to a mock without expectations, so any call
/// a test did not plan for fails loudly.
#[derive(Default)]
pub struct TestUow {
    pub users: Arc<MockUserRepository>,
    pub sellers: Arc<MockSellerRepository>,
    pub otps: Arc<MockOtpRepository>,
    pub regions: Arc<MockRegionRepository>,
    pub addresses: Arc<MockAddressRepository>,
    pub shops: Arc<MockShopRepository>,
    pub categories: Arc<MockCategoryRepository>,
    pub brands: Arc<MockBrandRepository>,
    pub compositions: Arc<MockCompositionRepository>,
    pub products: Arc<MockProductRepository>,
    pub devices: Arc<MockDeviceRepository>,
    /// Writers handed to transaction closures
    pub tx_products: MockProductWriter,
    pub tx_shops: MockShopWriter,
    pub tx_addresses: MockAddressWriter,
}

#[async_trait]
impl UnitOfWork for TestUow {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn sellers(&self) -> Arc<dyn SellerRepository> {
        self.sellers.clone()
    }

    fn otps(&self) -> Arc<dyn OtpRepository> {
        self.otps.clone()
    }

    fn regions(&self) -> Arc<dyn RegionRepository> {
        self.regions.clone()
    }

    fn addresses(&self) -> Arc<dyn AddressRepository> {
        self.addresses.clone()
    }

    fn shops(&self) -> Arc<dyn ShopRepository> {
        self.shops.clone()
    }

    fn categories(&self) -> Arc<dyn CategoryRepository> {
        self.categories.clone()
    }

    fn brands(&self) -> Arc<dyn BrandRepository> {
        self.brands.clone()
    }

    fn compositions(&self) -> Arc<dyn CompositionRepository> {
        self.compositions.clone()
    }

    fn products(&self) -> Arc<dyn ProductRepository> {
        self.products.clone()
    }

    fn devices(&self) -> Arc<dyn DeviceRepository> {
        self.devices.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        f(TransactionContext::new(
            &self.tx_products,
            &self.tx_shops,
            &self.tx_addresses,
        ))
        .await
    }
}
