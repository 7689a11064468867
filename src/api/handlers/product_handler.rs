//! Product handlers.

use axum::{
    extract::{Extension, FromRequest, Multipart, Path, Query, Request, State},
    http::header::CONTENT_TYPE,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentAccount;
use crate::api::AppState;
use crate::domain::{
    CompositionLink, ImageSource, NewProduct, Pricing, ProductChanges, ProductDraft,
    ProductFilter, ProductImageResponse, ProductPatch, ProductResponse, QtyType,
};
use crate::errors::{AppError, AppResult};
use crate::types::{Created, NoContent, Paginated, PaginationParams};
use crate::utils::nullable;

/// Multipart field carrying the uploaded file
const IMAGE_FIELD: &str = "image";

/// One composition line of a product
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CompositionLineRequest {
    pub composition_id: Uuid,
    #[validate(range(min = 0.0, message = "Quantity cannot be negative"))]
    #[schema(example = 12.5)]
    pub qty: f64,
    pub qty_type: QtyType,
}

impl From<CompositionLineRequest> for CompositionLink {
    fn from(line: CompositionLineRequest) -> Self {
        Self {
            composition_id: line.composition_id,
            qty: line.qty,
            qty_type: line.qty_type,
        }
    }
}

/// Product creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    pub category_id: Uuid,
    pub shop_id: Uuid,
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    #[schema(example = "Süýt 1L")]
    pub name_tm: String,
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    #[schema(example = "Milk 1L")]
    pub name_en: String,
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    #[schema(example = "Молоко 1Л")]
    pub name_ru: String,
    /// Derived from the English name when empty
    #[validate(length(max = 255, message = "Slug is too long"))]
    pub slug: Option<String>,
    pub description: Option<String>,
    /// Price in the smallest currency unit
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    #[schema(example = 1500)]
    pub price: i64,
    /// Must stay below the price
    #[schema(example = 1200)]
    pub discount_price: Option<i64>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    #[serde(default)]
    pub stock: i32,
    pub status: Option<bool>,
    #[serde(default)]
    pub brand_ids: Vec<Uuid>,
    #[serde(default)]
    #[validate(nested)]
    pub compositions: Vec<CompositionLineRequest>,
    /// Base64 images or data URIs, stored in order
    #[serde(default)]
    pub images: Vec<String>,
}

/// Product update request
///
/// Brand and composition lists replace the current ones when present.
/// Images are appended.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    pub category_id: Option<Uuid>,
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name_tm: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name_en: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name_ru: Option<String>,
    #[validate(length(max = 255, message = "Slug is too long"))]
    pub slug: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price: Option<i64>,
    /// `null` removes the discount
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<i64>)]
    pub discount_price: Option<Option<i64>>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i32>,
    pub status: Option<bool>,
    pub brand_ids: Option<Vec<Uuid>>,
    #[validate(nested)]
    pub compositions: Option<Vec<CompositionLineRequest>>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Inline image upload
#[derive(Debug, Deserialize, ToSchema)]
pub struct InlineImageRequest {
    /// Base64 image or data URI
    pub image: String,
}

/// Public product reads
pub fn product_public_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/:id", get(get_product))
}

/// Product writes (shop owner or admin)
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(create_product))
        .route("/products/:id", put(update_product).delete(delete_product))
        .route("/products/:id/images", post(add_product_image))
        .route("/products/:id/images/:image_id", delete(remove_product_image))
}

/// List products
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    params(ProductFilter, PaginationParams),
    responses(
        (status = 200, description = "Page of products", body = PaginatedProducts)
    )
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<ProductResponse>>> {
    let page = state.services.products().list_products(filter, params).await?;
    Ok(Json(page.map(ProductResponse::from)))
}

/// Get product by ID
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product with its relations", body = ProductResponse),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ProductResponse>> {
    Ok(Json(state.services.products().get_product(id).await?))
}

/// Create a product (shop owner or admin)
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    security(("bearer_auth" = [])),
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 403, description = "Forbidden - Not the shop owner"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_product(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateProductRequest>,
) -> AppResult<Created<ProductResponse>> {
    let draft = ProductDraft {
        product: NewProduct {
            category_id: payload.category_id,
            shop_id: payload.shop_id,
            name_tm: payload.name_tm,
            name_en: payload.name_en,
            name_ru: payload.name_ru,
            slug: payload.slug.unwrap_or_default(),
            description: payload.description,
            pricing: Pricing {
                price: payload.price,
                discount_price: payload.discount_price,
            },
            stock: payload.stock,
            status: payload.status.unwrap_or(true),
        },
        brand_ids: payload.brand_ids,
        compositions: payload.compositions.into_iter().map(Into::into).collect(),
        images: payload.images,
    };
    let product = state
        .services
        .products()
        .create_product(current.actor(), draft)
        .await?;

    Ok(Created(product))
}

/// Update a product (shop owner or admin)
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Products",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 403, description = "Forbidden - Not the shop owner"),
        (status = 404, description = "Product not found"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn update_product(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateProductRequest>,
) -> AppResult<Json<ProductResponse>> {
    let patch = ProductPatch {
        changes: ProductChanges {
            category_id: payload.category_id,
            name_tm: payload.name_tm,
            name_en: payload.name_en,
            name_ru: payload.name_ru,
            slug: payload.slug,
            description: payload.description,
            pricing: None,
            stock: payload.stock,
            status: payload.status,
        },
        price: payload.price,
        discount_price: payload.discount_price,
        brand_ids: payload.brand_ids,
        compositions: payload
            .compositions
            .map(|lines| lines.into_iter().map(Into::into).collect()),
        images: payload.images,
    };
    let product = state
        .services
        .products()
        .update_product(current.actor(), id, patch)
        .await?;

    Ok(Json(product))
}

/// Delete a product with its images (shop owner or admin)
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Products",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 403, description = "Forbidden - Not the shop owner"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn delete_product(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state
        .services
        .products()
        .delete_product(current.actor(), id)
        .await?;
    Ok(NoContent)
}

/// Read the upload from a multipart form or an inline JSON body.
async fn image_source(state: &AppState, request: Request) -> AppResult<ImageSource> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));

    if !is_multipart {
        let Json(body) = Json::<InlineImageRequest>::from_request(request, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        return Ok(ImageSource::Inline(body.image));
    }

    let mut multipart = Multipart::from_request(request, state)
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() == Some(IMAGE_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return Ok(ImageSource::Bytes(bytes.to_vec()));
        }
    }

    Err(AppError::field(IMAGE_FIELD, "The image field is required."))
}

/// Append an image to a product (shop owner or admin)
///
/// Accepts `multipart/form-data` with an `image` file field, or a JSON
/// body with an inline base64 `image`.
#[utoipa::path(
    post,
    path = "/api/products/{id}/images",
    tag = "Products",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body(content = InlineImageRequest, description = "Inline image, or multipart form with an `image` file"),
    responses(
        (status = 201, description = "Image stored", body = ProductImageResponse),
        (status = 403, description = "Forbidden - Not the shop owner"),
        (status = 404, description = "Product not found"),
        (status = 422, description = "Not a supported image")
    )
)]
pub async fn add_product_image(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Request,
) -> AppResult<Created<ProductImageResponse>> {
    let source = image_source(&state, request).await?;
    let image = state
        .services
        .products()
        .add_image(current.actor(), id, source)
        .await?;

    Ok(Created(ProductImageResponse::from(image)))
}

/// Remove one product image (shop owner or admin)
#[utoipa::path(
    delete,
    path = "/api/products/{id}/images/{image_id}",
    tag = "Products",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("image_id" = Uuid, Path, description = "Image ID")
    ),
    responses(
        (status = 204, description = "Image removed"),
        (status = 403, description = "Forbidden - Not the shop owner"),
        (status = 404, description = "Product or image not found")
    )
)]
pub async fn remove_product_image(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Path((id, image_id)): Path<(Uuid, Uuid)>,
) -> AppResult<NoContent> {
    state
        .services
        .products()
        .remove_image(current.actor(), id, image_id)
        .await?;
    Ok(NoContent)
}
