//! HTTP request handlers.
//!
//! Each module exposes its routers. `*_public_routes` are mounted without
//! authentication, the others behind the JWT middleware.

mod address;
pub mod catalog_handler;
pub mod category_handler;
pub mod device_handler;
pub mod otp_handler;
pub mod product_handler;
pub mod region_handler;
pub mod seller_handler;
pub mod shop_handler;
pub mod user_handler;

pub use address::AddressRequest;
pub use catalog_handler::{catalog_public_routes, catalog_routes};
pub use category_handler::{category_public_routes, category_routes};
pub use device_handler::device_routes;
pub use otp_handler::otp_routes;
pub use product_handler::{product_public_routes, product_routes};
pub use region_handler::{region_public_routes, region_routes};
pub use seller_handler::seller_routes;
pub use shop_handler::{shop_public_routes, shop_routes};
pub use user_handler::user_routes;
