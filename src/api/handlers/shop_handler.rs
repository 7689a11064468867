//! Shop handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    response::Json,
    routing::{get, post, put},
    Router,
};
use chrono::NaiveTime;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::address::AddressRequest;
use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentAccount;
use crate::api::AppState;
use crate::domain::{AddressResponse, BusinessHours, NewShop, ShopChanges, ShopFilter, ShopResponse};
use crate::errors::{AppError, AppResult};
use crate::types::{Created, NoContent, Paginated, PaginationParams};
use crate::utils::{PHONE_REGEX, TIME_REGEX};

/// Shop creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateShopRequest {
    /// Owner, defaults to the caller. Only admins may pick someone else.
    pub user_id: Option<Uuid>,
    pub region_id: Uuid,
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    #[schema(example = "Bereket Market")]
    pub name: String,
    /// Derived from the name when empty
    #[validate(length(max = 255, message = "Slug is too long"))]
    pub slug: Option<String>,
    pub description: Option<String>,
    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number"))]
    pub phone: Option<String>,
    /// Base64 image or data URI
    pub image: Option<String>,
    #[validate(regex(path = *TIME_REGEX, message = "Time must look like HH:MM"))]
    #[schema(example = "09:00")]
    pub opens_at: Option<String>,
    #[validate(regex(path = *TIME_REGEX, message = "Time must look like HH:MM"))]
    #[schema(example = "21:00")]
    pub closes_at: Option<String>,
    pub status: Option<bool>,
    #[validate(nested)]
    pub address: Option<AddressRequest>,
}

/// Shop update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateShopRequest {
    pub region_id: Option<Uuid>,
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(max = 255, message = "Slug is too long"))]
    pub slug: Option<String>,
    pub description: Option<String>,
    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number"))]
    pub phone: Option<String>,
    /// Base64 image or data URI, replaces the current one
    pub image: Option<String>,
    /// Both ends are replaced together
    #[validate(regex(path = *TIME_REGEX, message = "Time must look like HH:MM"))]
    pub opens_at: Option<String>,
    #[validate(regex(path = *TIME_REGEX, message = "Time must look like HH:MM"))]
    pub closes_at: Option<String>,
    pub status: Option<bool>,
}

/// Public shop reads
pub fn shop_public_routes() -> Router<AppState> {
    Router::new()
        .route("/shops", get(list_shops))
        .route("/shops/:id", get(get_shop))
}

/// Shop writes (owner or admin)
pub fn shop_routes() -> Router<AppState> {
    Router::new()
        .route("/shops", post(create_shop))
        .route("/shops/:id", put(update_shop).delete(delete_shop))
        .route(
            "/shops/:id/address",
            put(upsert_shop_address).delete(remove_shop_address),
        )
}

fn parse_time(field: &str, value: Option<&str>) -> AppResult<Option<NaiveTime>> {
    value
        .map(|raw| {
            NaiveTime::parse_from_str(raw, "%H:%M")
                .map_err(|_| AppError::field(field, "Time must look like HH:MM"))
        })
        .transpose()
}

fn parse_hours(opens_at: Option<&str>, closes_at: Option<&str>) -> AppResult<Option<BusinessHours>> {
    BusinessHours::from_request(
        parse_time("opens_at", opens_at)?,
        parse_time("closes_at", closes_at)?,
    )
}

/// List shops
#[utoipa::path(
    get,
    path = "/api/shops",
    tag = "Shops",
    params(ShopFilter, PaginationParams),
    responses(
        (status = 200, description = "Page of shops", body = PaginatedShops)
    )
)]
pub async fn list_shops(
    State(state): State<AppState>,
    Query(filter): Query<ShopFilter>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<ShopResponse>>> {
    let page = state.services.shops().list_shops(filter, params).await?;
    Ok(Json(page.map(ShopResponse::from)))
}

/// Get shop by ID
#[utoipa::path(
    get,
    path = "/api/shops/{id}",
    tag = "Shops",
    params(
        ("id" = Uuid, Path, description = "Shop ID")
    ),
    responses(
        (status = 200, description = "Shop with address", body = ShopResponse),
        (status = 404, description = "Shop not found")
    )
)]
pub async fn get_shop(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ShopResponse>> {
    Ok(Json(state.services.shops().get_shop(id).await?))
}

/// Open a shop
#[utoipa::path(
    post,
    path = "/api/shops",
    tag = "Shops",
    security(("bearer_auth" = [])),
    request_body = CreateShopRequest,
    responses(
        (status = 201, description = "Shop created", body = ShopResponse),
        (status = 403, description = "Forbidden - Only admins create shops for others"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_shop(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateShopRequest>,
) -> AppResult<Created<ShopResponse>> {
    let hours = parse_hours(payload.opens_at.as_deref(), payload.closes_at.as_deref())?;

    let shop = NewShop {
        user_id: payload.user_id.unwrap_or(current.id),
        region_id: payload.region_id,
        name: payload.name,
        slug: payload.slug.unwrap_or_default(),
        description: payload.description,
        phone: payload.phone,
        image: None,
        hours,
        status: payload.status.unwrap_or(true),
    };
    let created = state
        .services
        .shops()
        .create_shop(
            current.actor(),
            shop,
            payload.image,
            payload.address.map(Into::into),
        )
        .await?;

    Ok(Created(created))
}

/// Update a shop (owner or admin)
#[utoipa::path(
    put,
    path = "/api/shops/{id}",
    tag = "Shops",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Shop ID")
    ),
    request_body = UpdateShopRequest,
    responses(
        (status = 200, description = "Shop updated", body = ShopResponse),
        (status = 403, description = "Forbidden - Not the owner"),
        (status = 404, description = "Shop not found"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn update_shop(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateShopRequest>,
) -> AppResult<Json<ShopResponse>> {
    let hours = if payload.opens_at.is_some() || payload.closes_at.is_some() {
        Some(parse_hours(
            payload.opens_at.as_deref(),
            payload.closes_at.as_deref(),
        )?)
    } else {
        None
    };

    let changes = ShopChanges {
        region_id: payload.region_id,
        name: payload.name,
        slug: payload.slug,
        description: payload.description,
        phone: payload.phone,
        image: None,
        hours,
        status: payload.status,
    };
    let shop = state
        .services
        .shops()
        .update_shop(current.actor(), id, changes, payload.image)
        .await?;

    Ok(Json(ShopResponse::from(shop)))
}

/// Delete a shop with its products (owner or admin)
#[utoipa::path(
    delete,
    path = "/api/shops/{id}",
    tag = "Shops",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Shop ID")
    ),
    responses(
        (status = 204, description = "Shop deleted"),
        (status = 403, description = "Forbidden - Not the owner"),
        (status = 404, description = "Shop not found")
    )
)]
pub async fn delete_shop(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.services.shops().delete_shop(current.actor(), id).await?;
    Ok(NoContent)
}

/// Set the shop address (owner or admin)
#[utoipa::path(
    put,
    path = "/api/shops/{id}/address",
    tag = "Shops",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Shop ID")
    ),
    request_body = AddressRequest,
    responses(
        (status = 200, description = "Address saved", body = AddressResponse),
        (status = 403, description = "Forbidden - Not the owner"),
        (status = 404, description = "Shop not found"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn upsert_shop_address(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AddressRequest>,
) -> AppResult<Json<AddressResponse>> {
    let address = state
        .services
        .shops()
        .upsert_address(current.actor(), id, payload.into())
        .await?;
    Ok(Json(AddressResponse::from(address)))
}

/// Remove the shop address (owner or admin)
#[utoipa::path(
    delete,
    path = "/api/shops/{id}/address",
    tag = "Shops",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Shop ID")
    ),
    responses(
        (status = 204, description = "Address removed"),
        (status = 403, description = "Forbidden - Not the owner"),
        (status = 404, description = "Shop or address not found")
    )
)]
pub async fn remove_shop_address(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state
        .services
        .shops()
        .remove_address(current.actor(), id)
        .await?;
    Ok(NoContent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hours_pairs_both_ends() {
        let hours = parse_hours(Some("09:00"), Some("21:30")).unwrap().unwrap();
        assert_eq!(hours.opens_at, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(hours.closes_at, NaiveTime::from_hms_opt(21, 30, 0).unwrap());
        assert!(parse_hours(None, None).unwrap().is_none());
    }

    #[test]
    fn test_parse_hours_reports_missing_end() {
        match parse_hours(Some("09:00"), None) {
            Err(AppError::InvalidFields(fields)) => assert!(fields.contains_key("closes_at")),
            other => panic!("expected field error, got {:?}", other),
        }
    }
}
