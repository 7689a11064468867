//! Domain layer - Core business entities and logic
//!
//! Plain types for accounts, regions, shops, the catalog and devices.
//! Nothing here touches the database or HTTP.

pub mod account;
pub mod address;
pub mod category;
pub mod device;
pub mod image;
pub mod otp;
pub mod product;
pub mod region;
pub mod shop;
pub mod tree;

pub use account::{
    AccountChanges, AccountFilter, Actor, AccountKind, AccountStatus, NewAccount, Seller, SellerResponse, User,
    UserResponse, UserRole,
};
pub use address::{Address, AddressInput, AddressOwner, AddressResponse};
pub use category::{Category, CategoryChanges, CategoryResponse, CategorySummary, NewCategory};
pub use device::{Device, DeviceOwner, DeviceResponse, Platform};
pub use image::{ImageFormat, ImageSource, InlineImage};
pub use otp::{OneTimePassword, OtpCode};
pub use product::{
    Brand, BrandChanges, BrandResponse, Composition, CompositionChanges, CompositionLink,
    CompositionResponse, NewBrand, NewComposition, NewProduct, Pricing, ProductDraft, ProductPatch,
    Product, ProductChanges, ProductCompositionResponse, ProductFilter, ProductImage,
    ProductImageResponse, ProductResponse, QtyType,
};
pub use region::{Region, RegionFilter, RegionInput, RegionKind, RegionResponse};
pub use shop::{BusinessHours, NewShop, Shop, ShopChanges, ShopFilter, ShopResponse};
pub use tree::{build_forest, descendants, TreeItem};
