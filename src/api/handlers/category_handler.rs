//! Category handlers.

use axum::{
    extract::{Extension, Path, State},
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
use crate::domain::{CategoryChanges, CategoryResponse, NewCategory};
use crate::errors::AppResult;
use crate::types::{Created, NoContent};
use crate::utils::nullable;

/// Category creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryRequest {
    /// Parent category, top level when absent
    pub category_id: Option<Uuid>,
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    #[schema(example = "Süýt önümleri")]
    pub name_tm: String,
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    #[schema(example = "Dairy")]
    pub name_en: String,
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    #[schema(example = "Молочные продукты")]
    pub name_ru: String,
    /// Derived from the English name when empty
    #[validate(length(max = 255, message = "Slug is too long"))]
    pub slug: Option<String>,
    /// Base64 image or data URI
    pub image: Option<String>,
}

/// Category update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryRequest {
    /// `null` moves the category to the top level
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<Uuid>)]
    pub category_id: Option<Option<Uuid>>,
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name_tm: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name_en: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name_ru: Option<String>,
    #[validate(length(max = 255, message = "Slug is too long"))]
    pub slug: Option<String>,
    /// Base64 image or data URI, replaces the current one
    pub image: Option<String>,
}

/// Public category reads
pub fn category_public_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(category_tree))
        .route("/categories/:id", get(get_category))
}

/// Category writes (admin only)
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", post(create_category))
        .route("/categories/:id", put(update_category).delete(delete_category))
}

/// Category tree
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Categories",
    responses(
        (status = 200, description = "Top level categories with nested children", body = Vec<CategoryResponse>)
    )
)]
pub async fn category_tree(State(state): State<AppState>) -> AppResult<Json<Vec<CategoryResponse>>> {
    Ok(Json(state.services.categories().category_tree().await?))
}

/// Get category by ID
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    tag = "Categories",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category with direct children", body = CategoryResponse),
        (status = 404, description = "Category not found")
    )
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CategoryResponse>> {
    Ok(Json(state.services.categories().get_category(id).await?))
}

/// Create a category (admin only)
#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Categories",
    security(("bearer_auth" = [])),
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_category(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateCategoryRequest>,
) -> AppResult<Created<CategoryResponse>> {
    require_admin(&current)?;

    let category = NewCategory {
        category_id: payload.category_id,
        name_tm: payload.name_tm,
        name_en: payload.name_en,
        name_ru: payload.name_ru,
        slug: payload.slug.unwrap_or_default(),
        image: None,
    };
    let created = state
        .services
        .categories()
        .create_category(category, payload.image)
        .await?;

    Ok(Created(CategoryResponse::from(created)))
}

/// Update a category (admin only)
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    tag = "Categories",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Category not found"),
        (status = 422, description = "Validation error or parent cycle")
    )
)]
pub async fn update_category(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateCategoryRequest>,
) -> AppResult<Json<CategoryResponse>> {
    require_admin(&current)?;

    let changes = CategoryChanges {
        category_id: payload.category_id,
        name_tm: payload.name_tm,
        name_en: payload.name_en,
        name_ru: payload.name_ru,
        slug: payload.slug,
        image: None,
    };
    let category = state
        .services
        .categories()
        .update_category(id, changes, payload.image)
        .await?;

    Ok(Json(CategoryResponse::from(category)))
}

/// Delete a category (admin only)
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "Categories",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Category still has subcategories or products")
    )
)]
pub async fn delete_category(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    require_admin(&current)?;
    state.services.categories().delete_category(id).await?;
    Ok(NoContent)
}
