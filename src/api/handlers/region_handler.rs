//! Region handlers.

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

use super::address::AddressRequest;
use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentAccount};
use crate::api::AppState;
use crate::domain::{AddressResponse, RegionFilter, RegionInput, RegionKind, RegionResponse};
use crate::errors::AppResult;
use crate::types::{Created, NoContent};

/// Region create / update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegionRequest {
    /// Required for everything below a country
    pub parent_id: Option<Uuid>,
    pub kind: RegionKind,
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    #[schema(example = "Aşgabat")]
    pub name_tm: String,
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    #[schema(example = "Ashgabat")]
    pub name_en: String,
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    #[schema(example = "Ашхабад")]
    pub name_ru: String,
}

impl From<RegionRequest> for RegionInput {
    fn from(request: RegionRequest) -> Self {
        Self {
            parent_id: request.parent_id,
            kind: request.kind,
            name_tm: request.name_tm,
            name_en: request.name_en,
            name_ru: request.name_ru,
        }
    }
}

/// Public region reads
pub fn region_public_routes() -> Router<AppState> {
    Router::new()
        .route("/regions", get(list_regions))
        .route("/regions/tree", get(region_tree))
        .route("/regions/:id", get(get_region))
}

/// Region writes (admin only)
pub fn region_routes() -> Router<AppState> {
    Router::new()
        .route("/regions", post(create_region))
        .route("/regions/:id", put(update_region).delete(delete_region))
        .route(
            "/regions/:id/address",
            put(upsert_region_address).delete(remove_region_address),
        )
}

/// List regions
#[utoipa::path(
    get,
    path = "/api/regions",
    tag = "Regions",
    params(RegionFilter),
    responses(
        (status = 200, description = "Matching regions", body = Vec<RegionResponse>)
    )
)]
pub async fn list_regions(
    State(state): State<AppState>,
    Query(filter): Query<RegionFilter>,
) -> AppResult<Json<Vec<RegionResponse>>> {
    let regions = state.services.regions().list_regions(filter).await?;
    Ok(Json(regions.into_iter().map(RegionResponse::from).collect()))
}

/// Full region hierarchy
#[utoipa::path(
    get,
    path = "/api/regions/tree",
    tag = "Regions",
    responses(
        (status = 200, description = "Countries with nested regions", body = Vec<RegionResponse>)
    )
)]
pub async fn region_tree(State(state): State<AppState>) -> AppResult<Json<Vec<RegionResponse>>> {
    Ok(Json(state.services.regions().region_tree().await?))
}

/// Get region by ID
#[utoipa::path(
    get,
    path = "/api/regions/{id}",
    tag = "Regions",
    params(
        ("id" = Uuid, Path, description = "Region ID")
    ),
    responses(
        (status = 200, description = "Region with children and address", body = RegionResponse),
        (status = 404, description = "Region not found")
    )
)]
pub async fn get_region(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RegionResponse>> {
    Ok(Json(state.services.regions().get_region(id).await?))
}

/// Create a region (admin only)
#[utoipa::path(
    post,
    path = "/api/regions",
    tag = "Regions",
    security(("bearer_auth" = [])),
    request_body = RegionRequest,
    responses(
        (status = 201, description = "Region created", body = RegionResponse),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_region(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegionRequest>,
) -> AppResult<Created<RegionResponse>> {
    require_admin(&current)?;
    let region = state.services.regions().create_region(payload.into()).await?;
    Ok(Created(RegionResponse::from(region)))
}

/// Update a region (admin only)
#[utoipa::path(
    put,
    path = "/api/regions/{id}",
    tag = "Regions",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Region ID")
    ),
    request_body = RegionRequest,
    responses(
        (status = 200, description = "Region updated", body = RegionResponse),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Region not found"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn update_region(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<RegionRequest>,
) -> AppResult<Json<RegionResponse>> {
    require_admin(&current)?;
    let region = state
        .services
        .regions()
        .update_region(id, payload.into())
        .await?;
    Ok(Json(RegionResponse::from(region)))
}

/// Delete a region (admin only)
#[utoipa::path(
    delete,
    path = "/api/regions/{id}",
    tag = "Regions",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Region ID")
    ),
    responses(
        (status = 204, description = "Region deleted"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Region not found"),
        (status = 409, description = "Region still has children or shops")
    )
)]
pub async fn delete_region(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    require_admin(&current)?;
    state.services.regions().delete_region(id).await?;
    Ok(NoContent)
}

/// Set the region address (admin only)
#[utoipa::path(
    put,
    path = "/api/regions/{id}/address",
    tag = "Regions",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Region ID")
    ),
    request_body = AddressRequest,
    responses(
        (status = 200, description = "Address saved", body = AddressResponse),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Region not found"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn upsert_region_address(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AddressRequest>,
) -> AppResult<Json<AddressResponse>> {
    require_admin(&current)?;
    let address = state
        .services
        .regions()
        .upsert_address(id, payload.into())
        .await?;
    Ok(Json(AddressResponse::from(address)))
}

/// Remove the region address (admin only)
#[utoipa::path(
    delete,
    path = "/api/regions/{id}/address",
    tag = "Regions",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Region ID")
    ),
    responses(
        (status = 204, description = "Address removed"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Region or address not found")
    )
)]
pub async fn remove_region_address(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    require_admin(&current)?;
    state.services.regions().remove_address(id).await?;
    Ok(NoContent)
}
