//! User handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, require_self_or_admin, require_user, CurrentAccount};
use crate::api::AppState;
use crate::domain::{AccountChanges, AccountFilter, AccountStatus, NewAccount, UserResponse, UserRole};
use crate::errors::{AppError, AppResult};
use crate::types::{Created, NoContent, Paginated, PaginationParams};
use crate::utils::PHONE_REGEX;

/// User creation request (admin only)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    #[schema(example = "Aman Orazow")]
    pub name: String,
    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number"))]
    #[schema(example = "+99365123456")]
    pub phone: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    /// Base64 image or data URI
    pub image: Option<String>,
    pub status: Option<AccountStatus>,
    pub role: Option<UserRole>,
}

/// User update request with validation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
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
    /// Admin only
    pub role: Option<UserRole>,
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/me", get(get_current_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/:id/restore", post(restore_user))
        .route("/users/:id/force", delete(force_delete_user))
}

/// Get current authenticated user
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Sellers have no user profile")
    )
)]
pub async fn get_current_user(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
) -> AppResult<Json<UserResponse>> {
    require_user(&current)?;
    let user = state.services.users().get_user(current.id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// List users (admin only)
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(AccountFilter, PaginationParams),
    responses(
        (status = 200, description = "Page of users", body = PaginatedUsers),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn list_users(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Query(filter): Query<AccountFilter>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<UserResponse>>> {
    require_admin(&current)?;
    let page = state.services.users().list_users(filter, params).await?;
    Ok(Json(page.map(UserResponse::from)))
}

/// Create a user (admin only)
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_user(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<Created<UserResponse>> {
    require_admin(&current)?;

    let account = NewAccount {
        name: payload.name,
        phone: payload.phone,
        email: payload.email,
        image: None,
        status: payload.status,
        role: payload.role,
    };
    let user = state
        .services
        .users()
        .create_user(account, payload.image)
        .await?;

    Ok(Created(UserResponse::from(user)))
}

/// Get user by ID (own profile or admin)
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Can only view own profile unless admin"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    require_self_or_admin(&current, id)?;

    // Admins can still look at deleted accounts
    let user = if current.is_admin() {
        state.services.users().get_user_with_deleted(id).await?
    } else {
        state.services.users().get_user(id).await?
    };

    Ok(Json(UserResponse::from(user)))
}

/// Update user (own profile or admin)
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 403, description = "Forbidden - Only admins can change role or status"),
        (status = 404, description = "User not found"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn update_user(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    require_self_or_admin(&current, id)?;
    if (payload.role.is_some() || payload.status.is_some()) && !current.is_admin() {
        return Err(AppError::Forbidden);
    }

    let changes = AccountChanges {
        name: payload.name,
        phone: payload.phone,
        email: payload.email,
        image: None,
        status: payload.status,
        role: payload.role,
    };
    let user = state
        .services
        .users()
        .update_user(id, changes, payload.image)
        .await?;

    Ok(Json(UserResponse::from(user)))
}

/// Soft delete user (admin only)
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    require_admin(&current)?;
    state.services.users().delete_user(id).await?;
    Ok(NoContent)
}

/// Restore a soft-deleted user (admin only)
#[utoipa::path(
    post,
    path = "/api/users/{id}/restore",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User restored", body = UserResponse),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "User not found"),
        (status = 422, description = "User is not deleted")
    )
)]
pub async fn restore_user(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    require_admin(&current)?;
    let user = state.services.users().restore_user(id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Permanently delete user (admin only)
#[utoipa::path(
    delete,
    path = "/api/users/{id}/force",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User permanently deleted"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn force_delete_user(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    require_admin(&current)?;
    state.services.users().hard_delete_user(id).await?;
    Ok(NoContent)
}
