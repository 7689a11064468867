//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    catalog_handler, category_handler, device_handler, otp_handler, product_handler,
    region_handler, seller_handler, shop_handler, user_handler, AddressRequest,
};
use crate::domain::{
    AccountKind, AccountStatus, AddressResponse, BrandResponse, CategoryResponse,
    CategorySummary, CompositionResponse, DeviceResponse, Platform, ProductCompositionResponse,
    ProductImageResponse, ProductResponse, QtyType, RegionKind, RegionResponse, SellerResponse,
    ShopResponse, UserResponse, UserRole,
};
use crate::services::{OtpSentResponse, TokenResponse};
use crate::types::{
    MessageResponse, PaginatedBrands, PaginatedCompositions, PaginatedProducts,
    PaginatedSellers, PaginatedShops, PaginatedUsers, PaginationMeta,
};

/// OpenAPI documentation for the marketplace API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Market API",
        version = "0.1.0",
        description = "Marketplace administration: accounts, regions, shops and the product catalog",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Sign-in
        otp_handler::generate_user_otp,
        otp_handler::user_login,
        otp_handler::generate_seller_otp,
        otp_handler::seller_login,
        // Users
        user_handler::get_current_user,
        user_handler::list_users,
        user_handler::create_user,
        user_handler::get_user,
        user_handler::update_user,
        user_handler::delete_user,
        user_handler::restore_user,
        user_handler::force_delete_user,
        // Sellers
        seller_handler::get_current_seller,
        seller_handler::list_sellers,
        seller_handler::create_seller,
        seller_handler::get_seller,
        seller_handler::update_seller,
        seller_handler::delete_seller,
        // Regions
        region_handler::list_regions,
        region_handler::region_tree,
        region_handler::get_region,
        region_handler::create_region,
        region_handler::update_region,
        region_handler::delete_region,
        region_handler::upsert_region_address,
        region_handler::remove_region_address,
        // Shops
        shop_handler::list_shops,
        shop_handler::get_shop,
        shop_handler::create_shop,
        shop_handler::update_shop,
        shop_handler::delete_shop,
        shop_handler::upsert_shop_address,
        shop_handler::remove_shop_address,
        // Categories
        category_handler::category_tree,
        category_handler::get_category,
        category_handler::create_category,
        category_handler::update_category,
        category_handler::delete_category,
        // Brands and compositions
        catalog_handler::list_brands,
        catalog_handler::get_brand,
        catalog_handler::create_brand,
        catalog_handler::update_brand,
        catalog_handler::delete_brand,
        catalog_handler::list_compositions,
        catalog_handler::get_composition,
        catalog_handler::create_composition,
        catalog_handler::update_composition,
        catalog_handler::delete_composition,
        // Products
        product_handler::list_products,
        product_handler::get_product,
        product_handler::create_product,
        product_handler::update_product,
        product_handler::delete_product,
        product_handler::add_product_image,
        product_handler::remove_product_image,
        // Devices
        device_handler::list_devices,
        device_handler::register_device,
        device_handler::remove_device,
    ),
    components(
        schemas(
            // Domain types
            AccountKind,
            AccountStatus,
            UserRole,
            RegionKind,
            Platform,
            QtyType,
            UserResponse,
            SellerResponse,
            RegionResponse,
            AddressResponse,
            ShopResponse,
            CategoryResponse,
            CategorySummary,
            BrandResponse,
            CompositionResponse,
            ProductCompositionResponse,
            ProductImageResponse,
            ProductResponse,
            DeviceResponse,
            // Auth types
            otp_handler::GenerateOtpRequest,
            otp_handler::OtpLoginRequest,
            OtpSentResponse,
            TokenResponse,
            // Request bodies
            user_handler::CreateUserRequest,
            user_handler::UpdateUserRequest,
            seller_handler::CreateSellerRequest,
            seller_handler::UpdateSellerRequest,
            region_handler::RegionRequest,
            AddressRequest,
            shop_handler::CreateShopRequest,
            shop_handler::UpdateShopRequest,
            category_handler::CreateCategoryRequest,
            category_handler::UpdateCategoryRequest,
            catalog_handler::CreateBrandRequest,
            catalog_handler::UpdateBrandRequest,
            catalog_handler::CreateCompositionRequest,
            catalog_handler::UpdateCompositionRequest,
            product_handler::CompositionLineRequest,
            product_handler::CreateProductRequest,
            product_handler::UpdateProductRequest,
            product_handler::InlineImageRequest,
            device_handler::RegisterDeviceRequest,
            // Shared envelopes
            MessageResponse,
            PaginationMeta,
            PaginatedUsers,
            PaginatedSellers,
            PaginatedShops,
            PaginatedBrands,
            PaginatedCompositions,
            PaginatedProducts,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "One-time code sign-in for users and sellers"),
        (name = "Users", description = "User management operations"),
        (name = "Sellers", description = "Seller management operations"),
        (name = "Regions", description = "Country, province, city and district hierarchy"),
        (name = "Shops", description = "Shops and their addresses"),
        (name = "Categories", description = "Product category tree"),
        (name = "Catalog", description = "Brands and compositions"),
        (name = "Products", description = "Products and their images"),
        (name = "Devices", description = "Push notification tokens")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /api/otp/login"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_resource_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/otp/login",
            "/api/users/{id}/force",
            "/api/regions/tree",
            "/api/shops/{id}/address",
            "/api/products/{id}/images/{image_id}",
            "/api/devices",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
