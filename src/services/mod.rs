//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! All services use Unit of Work pattern for centralized repository
//! access and transaction management.

mod auth_service;
mod catalog_service;
mod category_service;
pub mod container;
mod device_service;
mod image_service;
mod product_service;
mod region_service;
mod seller_service;
mod shop_service;
mod sms;
mod user_service;

#[cfg(test)]
mod testing;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{AuthService, Authenticator, Claims, OtpSentResponse, TokenResponse};
pub use catalog_service::{CatalogManager, CatalogService};
pub use category_service::{CategoryManager, CategoryService};
pub use device_service::{DeviceManager, DeviceService};
pub use image_service::ImageService;
pub use product_service::{ProductManager, ProductService};
pub use region_service::{RegionManager, RegionService};
pub use seller_service::{SellerManager, SellerService};
pub use shop_service::{ShopManager, ShopService};
pub use sms::{LogSms, QueuedSms, SmsSender};
pub use user_service::{UserManager, UserService};

// Parallel execution utilities
pub use container::parallel;

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use sms::MockSmsSender;
