//! Service Container - Centralized service access with parallel execution support.
//!
//! SOLID (SRP): Manages service lifecycle and access.
//! SOLID (DIP): Depends on service traits, not implementations.
//!
//! Features:
//! - Centralized access to all application services
//! - Thread-safe concurrent access via Arc
//! - Parallel execution of independent reads

use std::future::Future;
use std::sync::Arc;

use super::{
    AuthService, CatalogService, CategoryService, DeviceService, ImageService, ProductService,
    RegionService, SellerService, ShopService, SmsSender, UserService,
};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{FileStorage, Persistence};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
///
/// Provides centralized access to all application services.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get user service
    fn users(&self) -> Arc<dyn UserService>;

    fn sellers(&self) -> Arc<dyn SellerService>;

    fn regions(&self) -> Arc<dyn RegionService>;

    fn shops(&self) -> Arc<dyn ShopService>;

    fn categories(&self) -> Arc<dyn CategoryService>;

    /// Brands and compositions
    fn catalog(&self) -> Arc<dyn CatalogService>;

    fn products(&self) -> Arc<dyn ProductService>;

    fn devices(&self) -> Arc<dyn DeviceService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<dyn AuthService>,
    pub users: Arc<dyn UserService>,
    pub sellers: Arc<dyn SellerService>,
    pub regions: Arc<dyn RegionService>,
    pub shops: Arc<dyn ShopService>,
    pub categories: Arc<dyn CategoryService>,
    pub catalog: Arc<dyn CatalogService>,
    pub products: Arc<dyn ProductService>,
    pub devices: Arc<dyn DeviceService>,
}

impl Services {
    /// Create service container from database connection and config
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        config: Config,
        sms: Arc<dyn SmsSender>,
        storage: Arc<dyn FileStorage>,
    ) -> Self {
        use super::{
            Authenticator, CatalogManager, CategoryManager, DeviceManager, ProductManager,
            RegionManager, SellerManager, ShopManager, UserManager,
        };

        let uow = Arc::new(Persistence::new(db));
        let images = ImageService::new(storage, config.max_image_bytes);

        Self {
            users: Arc::new(UserManager::new(uow.clone(), images.clone())),
            sellers: Arc::new(SellerManager::new(uow.clone(), images.clone())),
            regions: Arc::new(RegionManager::new(uow.clone())),
            shops: Arc::new(ShopManager::new(uow.clone(), images.clone())),
            categories: Arc::new(CategoryManager::new(uow.clone(), images.clone())),
            catalog: Arc::new(CatalogManager::new(uow.clone(), images.clone())),
            products: Arc::new(ProductManager::new(uow.clone(), images)),
            devices: Arc::new(DeviceManager::new(uow.clone())),
            auth: Arc::new(Authenticator::new(uow, sms, config)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.users.clone()
    }

    fn sellers(&self) -> Arc<dyn SellerService> {
        self.sellers.clone()
    }

    fn regions(&self) -> Arc<dyn RegionService> {
        self.regions.clone()
    }

    fn shops(&self) -> Arc<dyn ShopService> {
        self.shops.clone()
    }

    fn categories(&self) -> Arc<dyn CategoryService> {
        self.categories.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogService> {
        self.catalog.clone()
    }

    fn products(&self) -> Arc<dyn ProductService> {
        self.products.clone()
    }

    fn devices(&self) -> Arc<dyn DeviceService> {
        self.devices.clone()
    }
}

/// Parallel execution utilities for running independent operations concurrently.
///
/// These functions leverage tokio's async runtime to execute multiple
/// independent operations in parallel, improving throughput.
pub mod parallel {
    use super::*;
    use tokio::try_join;

    /// Execute two independent async operations in parallel.
    ///
    /// Both operations run concurrently and the function returns when both complete.
    /// If either operation fails, the error is returned immediately.
    ///
    /// # Example
    /// ```ignore
    /// let (compositions, images) = parallel::join2(
    ///     products.compositions_of(id),
    ///     products.images_of(id),
    /// ).await?;
    /// ```
    pub async fn join2<F1, F2, T1, T2>(f1: F1, f2: F2) -> AppResult<(T1, T2)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
    {
        try_join!(f1, f2)
    }

    /// Execute four independent async operations in parallel.
    pub async fn join4<F1, F2, F3, F4, T1, T2, T3, T4>(
        f1: F1,
        f2: F2,
        f3: F3,
        f4: F4,
    ) -> AppResult<(T1, T2, T3, T4)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
        F3: Future<Output = AppResult<T3>>,
        F4: Future<Output = AppResult<T4>>,
    {
        try_join!(f1, f2, f3, f4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_parallel_join2() {
        async fn op1() -> AppResult<i32> {
            Ok(1)
        }
        async fn op2() -> AppResult<i32> {
            Ok(2)
        }

        let (a, b) = parallel::join2(op1(), op2()).await.unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, 2);
    }

    #[tokio::test]
    async fn test_parallel_join4_fails_fast() {
        use crate::errors::AppError;

        async fn ok(n: i32) -> AppResult<i32> {
            Ok(n)
        }
        async fn fail() -> AppResult<i32> {
            Err(AppError::NotFound)
        }

        let result = parallel::join4(ok(1), ok(2), fail(), ok(4)).await;
        assert!(matches!(result, Err(AppError::NotFound)));

        let (a, b, c, d) = parallel::join4(ok(1), ok(2), ok(3), ok(4)).await.unwrap();
        assert_eq!(a + b + c + d, 10);
    }
}
