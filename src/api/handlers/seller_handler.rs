//! Seller handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, require_seller, CurrentAccount};
use crate::api::AppState;
use crate::domain::{AccountChanges, AccountFilter, AccountKind, AccountStatus, NewAccount, SellerResponse};
use crate::errors::{AppError, AppResult};
use crate::types::{Created, NoContent, Paginated, PaginationParams};
use crate::utils::PHONE_REGEX;

/// Seller creation request (admin only)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSellerRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    #[schema(example = "Merjen Atayewa")]
    pub name: String,
    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number"))]
    #[schema(example = "+99361234567")]
    pub phone: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    /// Base64 image or data URI
    pub image: Option<String>,
    pub status: Option<AccountStatus>,
}

/// Seller update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateSellerRequest {
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number"))]
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    /// Base64 image or data URI, replaces the current one
    pub image: Option<String>,
    /// Admin only
    pub status: Option<AccountStatus>,
}

/// Create seller routes
pub fn seller_routes() -> Router<AppState> {
    Router::new()
        .route("/sellers", get(list_sellers).post(create_seller))
        .route("/sellers/me", get(get_current_seller))
        .route(
            "/sellers/:id",
            get(get_seller).put(update_seller).delete(delete_seller),
        )
}

/// The caller is this seller, or an admin.
fn require_seller_or_admin(current: &CurrentAccount, id: Uuid) -> AppResult<()> {
    let own = current.kind == AccountKind::Seller && current.id == id;
    if own || current.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Get current authenticated seller
#[utoipa::path(
    get,
    path = "/api/sellers/me",
    tag = "Sellers",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current seller profile", body = SellerResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Users have no seller profile")
    )
)]
pub async fn get_current_seller(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
) -> AppResult<Json<SellerResponse>> {
    require_seller(&current)?;
    let seller = state.services.sellers().get_seller(current.id).await?;
    Ok(Json(SellerResponse::from(seller)))
}

/// List sellers (admin only)
#[utoipa::path(
    get,
    path = "/api/sellers",
    tag = "Sellers",
    security(("bearer_auth" = [])),
    params(AccountFilter, PaginationParams),
    responses(
        (status = 200, description = "Page of sellers", body = PaginatedSellers),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn list_sellers(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Query(filter): Query<AccountFilter>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<SellerResponse>>> {
    require_admin(&current)?;
    let page = state.services.sellers().list_sellers(filter, params).await?;
    Ok(Json(page.map(SellerResponse::from)))
}

/// Create a seller (admin only)
#[utoipa::path(
    post,
    path = "/api/sellers",
    tag = "Sellers",
    security(("bearer_auth" = [])),
    request_body = CreateSellerRequest,
    responses(
        (status = 201, description = "Seller created", body = SellerResponse),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_seller(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateSellerRequest>,
) -> AppResult<Created<SellerResponse>> {
    require_admin(&current)?;

    let account = NewAccount {
        name: payload.name,
        phone: payload.phone,
        email: payload.email,
        status: payload.status,
        ..Default::default()
    };
    let seller = state
        .services
        .sellers()
        .create_seller(account, payload.image)
        .await?;

    Ok(Created(SellerResponse::from(seller)))
}

/// Get seller by ID (own profile or admin)
#[utoipa::path(
    get,
    path = "/api/sellers/{id}",
    tag = "Sellers",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Seller ID")
    ),
    responses(
        (status = 200, description = "Seller profile", body = SellerResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Seller not found")
    )
)]
pub async fn get_seller(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SellerResponse>> {
    require_seller_or_admin(&current, id)?;
    let seller = state.services.sellers().get_seller(id).await?;
    Ok(Json(SellerResponse::from(seller)))
}

/// Update seller (own profile or admin)
#[utoipa::path(
    put,
    path = "/api/sellers/{id}",
    tag = "Sellers",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Seller ID")
    ),
    request_body = UpdateSellerRequest,
    responses(
        (status = 200, description = "Seller updated", body = SellerResponse),
        (status = 403, description = "Forbidden - Only admins can change status"),
        (status = 404, description = "Seller not found"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn update_seller(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateSellerRequest>,
) -> AppResult<Json<SellerResponse>> {
    require_seller_or_admin(&current, id)?;
    if payload.status.is_some() && !current.is_admin() {
        return Err(AppError::Forbidden);
    }

    let changes = AccountChanges {
        name: payload.name,
        phone: payload.phone,
        email: payload.email,
        status: payload.status,
        ..Default::default()
    };
    let seller = state
        .services
        .sellers()
        .update_seller(id, changes, payload.image)
        .await?;

    Ok(Json(SellerResponse::from(seller)))
}

/// Delete seller (admin only)
#[utoipa::path(
    delete,
    path = "/api/sellers/{id}",
    tag = "Sellers",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Seller ID")
    ),
    responses(
        (status = 204, description = "Seller deleted"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Seller not found")
    )
)]
pub async fn delete_seller(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    require_admin(&current)?;
    state.services.sellers().delete_seller(id).await?;
    Ok(NoContent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ROLE_ADMIN, ROLE_SELLER, ROLE_USER};

    fn account(kind: AccountKind, role: &str) -> CurrentAccount {
        CurrentAccount {
            id: Uuid::new_v4(),
            kind,
            role: role.to_string(),
        }
    }

    #[test]
    fn test_seller_reads_only_own_profile() {
        let seller = account(AccountKind::Seller, ROLE_SELLER);
        assert!(require_seller_or_admin(&seller, seller.id).is_ok());
        assert!(require_seller_or_admin(&seller, Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_user_with_same_id_is_not_the_seller() {
        let user = account(AccountKind::User, ROLE_USER);
        assert!(require_seller_or_admin(&user, user.id).is_err());

        let admin = account(AccountKind::User, ROLE_ADMIN);
        assert!(require_seller_or_admin(&admin, Uuid::new_v4()).is_ok());
    }
}
