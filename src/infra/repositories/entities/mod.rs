//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod address;
pub mod brand;
pub mod category;
pub mod composition;
pub mod device;
pub mod product;
pub mod product_brand;
pub mod product_composition;
pub mod product_image;
pub mod region;
pub mod seller;
pub mod seller_otp;
pub mod shop;
pub mod user;
pub mod user_otp;
