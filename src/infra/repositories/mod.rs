//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.
//! Writes that span several tables are exposed as free functions over
//! any `ConnectionTrait` so the unit of work can run them in a transaction.

pub(crate) mod address_repository;
mod base;
mod catalog_repository;
mod category_repository;
mod device_repository;
pub(crate) mod entities;
mod otp_repository;
pub(crate) mod product_repository;
mod region_repository;
mod seller_repository;
pub(crate) mod shop_repository;
mod user_repository;

pub use address_repository::{AddressRepository, AddressStore};
pub use base::{DeleteRepository, ReadRepository, WriteRepository};
pub use catalog_repository::{BrandRepository, BrandStore, CompositionRepository, CompositionStore};
pub use category_repository::{CategoryRepository, CategoryStore};
pub use device_repository::{DeviceRepository, DeviceStore};
pub use otp_repository::{OtpRepository, OtpStore};
pub use product_repository::{ProductRepository, ProductStore};
pub use region_repository::{RegionRepository, RegionStore};
pub use seller_repository::{SellerRepository, SellerStore};
pub use shop_repository::{ShopRepository, ShopStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use address_repository::MockAddressRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use catalog_repository::{MockBrandRepository, MockCompositionRepository};
#[cfg(any(test, feature = "test-utils"))]
pub use category_repository::MockCategoryRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use device_repository::MockDeviceRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use otp_repository::MockOtpRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use product_repository::MockProductRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use region_repository::MockRegionRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use seller_repository::MockSellerRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use shop_repository::MockShopRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
