//! Brand and composition handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentAccount};
use crate::api::AppState;
use crate::domain::{
    BrandChanges, BrandResponse, CompositionChanges, CompositionResponse, NewBrand,
    NewComposition,
};
use crate::errors::AppResult;
use crate::types::{Created, NoContent, Paginated, PaginationParams};

/// Brand create request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBrandRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    #[schema(example = "Bagtyýar")]
    pub name: String,
    /// Derived from the name when empty
    #[validate(length(max = 255, message = "Slug is too long"))]
    pub slug: Option<String>,
    /// Base64 logo or data URI
    pub image: Option<String>,
}

/// Brand update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBrandRequest {
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(max = 255, message = "Slug is too long"))]
    pub slug: Option<String>,
    pub image: Option<String>,
}

/// Composition create request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCompositionRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    #[schema(example = "Şeker")]
    pub name_tm: String,
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    #[schema(example = "Sugar")]
    pub name_en: String,
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    #[schema(example = "Сахар")]
    pub name_ru: String,
}

/// Composition update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCompositionRequest {
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name_tm: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name_en: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name_ru: Option<String>,
}

/// Public brand and composition reads
pub fn catalog_public_routes() -> Router<AppState> {
    Router::new()
        .route("/brands", get(list_brands))
        .route("/brands/:id", get(get_brand))
        .route("/compositions", get(list_compositions))
        .route("/compositions/:id", get(get_composition))
}

/// Brand and composition writes (admin only)
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/brands", post(create_brand))
        .route("/brands/:id", put(update_brand).delete(delete_brand))
        .route("/compositions", post(create_composition))
        .route(
            "/compositions/:id",
            put(update_composition).delete(delete_composition),
        )
}

/// List brands
#[utoipa::path(
    get,
    path = "/api/brands",
    tag = "Catalog",
    params(PaginationParams),
    responses(
        (status = 200, description = "Page of brands", body = PaginatedBrands)
    )
)]
pub async fn list_brands(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<BrandResponse>>> {
    let page = state.services.catalog().list_brands(params).await?;
    Ok(Json(page.map(BrandResponse::from)))
}

/// Get brand by ID
#[utoipa::path(
    get,
    path = "/api/brands/{id}",
    tag = "Catalog",
    params(
        ("id" = Uuid, Path, description = "Brand ID")
    ),
    responses(
        (status = 200, description = "Brand", body = BrandResponse),
        (status = 404, description = "Brand not found")
    )
)]
pub async fn get_brand(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BrandResponse>> {
    let brand = state.services.catalog().get_brand(id).await?;
    Ok(Json(BrandResponse::from(brand)))
}

/// Create a brand (admin only)
#[utoipa::path(
    post,
    path = "/api/brands",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    request_body = CreateBrandRequest,
    responses(
        (status = 201, description = "Brand created", body = BrandResponse),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_brand(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateBrandRequest>,
) -> AppResult<Created<BrandResponse>> {
    require_admin(&current)?;

    let brand = NewBrand {
        name: payload.name,
        slug: payload.slug.unwrap_or_default(),
        image: None,
    };
    let created = state
        .services
        .catalog()
        .create_brand(brand, payload.image)
        .await?;

    Ok(Created(BrandResponse::from(created)))
}

/// Update a brand (admin only)
#[utoipa::path(
    put,
    path = "/api/brands/{id}",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Brand ID")
    ),
    request_body = UpdateBrandRequest,
    responses(
        (status = 200, description = "Brand updated", body = BrandResponse),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Brand not found"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn update_brand(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateBrandRequest>,
) -> AppResult<Json<BrandResponse>> {
    require_admin(&current)?;

    let changes = BrandChanges {
        name: payload.name,
        slug: payload.slug,
        image: None,
    };
    let brand = state
        .services
        .catalog()
        .update_brand(id, changes, payload.image)
        .await?;

    Ok(Json(BrandResponse::from(brand)))
}

/// Delete a brand (admin only)
#[utoipa::path(
    delete,
    path = "/api/brands/{id}",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Brand ID")
    ),
    responses(
        (status = 204, description = "Brand deleted"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Brand not found")
    )
)]
pub async fn delete_brand(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    require_admin(&current)?;
    state.services.catalog().delete_brand(id).await?;
    Ok(NoContent)
}

/// List compositions
#[utoipa::path(
    get,
    path = "/api/compositions",
    tag = "Catalog",
    params(PaginationParams),
    responses(
        (status = 200, description = "Page of compositions", body = PaginatedCompositions)
    )
)]
pub async fn list_compositions(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<CompositionResponse>>> {
    let page = state.services.catalog().list_compositions(params).await?;
    Ok(Json(page.map(CompositionResponse::from)))
}

/// Get composition by ID
#[utoipa::path(
    get,
    path = "/api/compositions/{id}",
    tag = "Catalog",
    params(
        ("id" = Uuid, Path, description = "Composition ID")
    ),
    responses(
        (status = 200, description = "Composition", body = CompositionResponse),
        (status = 404, description = "Composition not found")
    )
)]
pub async fn get_composition(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CompositionResponse>> {
    let composition = state.services.catalog().get_composition(id).await?;
    Ok(Json(CompositionResponse::from(composition)))
}

/// Create a composition (admin only)
#[utoipa::path(
    post,
    path = "/api/compositions",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    request_body = CreateCompositionRequest,
    responses(
        (status = 201, description = "Composition created", body = CompositionResponse),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_composition(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateCompositionRequest>,
) -> AppResult<Created<CompositionResponse>> {
    require_admin(&current)?;

    let composition = NewComposition {
        name_tm: payload.name_tm,
        name_en: payload.name_en,
        name_ru: payload.name_ru,
    };
    let created = state
        .services
        .catalog()
        .create_composition(composition)
        .await?;

    Ok(Created(CompositionResponse::from(created)))
}

/// Update a composition (admin only)
#[utoipa::path(
    put,
    path = "/api/compositions/{id}",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Composition ID")
    ),
    request_body = UpdateCompositionRequest,
    responses(
        (status = 200, description = "Composition updated", body = CompositionResponse),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Composition not found"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn update_composition(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateCompositionRequest>,
) -> AppResult<Json<CompositionResponse>> {
    require_admin(&current)?;

    let changes = CompositionChanges {
        name_tm: payload.name_tm,
        name_en: payload.name_en,
        name_ru: payload.name_ru,
    };
    let composition = state
        .services
        .catalog()
        .update_composition(id, changes)
        .await?;

    Ok(Json(CompositionResponse::from(composition)))
}

/// Delete a composition (admin only)
#[utoipa::path(
    delete,
    path = "/api/compositions/{id}",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Composition ID")
    ),
    responses(
        (status = 204, description = "Composition deleted"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Composition not found")
    )
)]
pub async fn delete_composition(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    require_admin(&current)?;
    state.services.catalog().delete_composition(id).await?;
    Ok(NoContent)
}
