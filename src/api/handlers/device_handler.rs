//! Push device handlers.

use axum::{
    extract::{Extension, Path, State},
    response::Json,
    routing::{delete, get},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentAccount;
use crate::api::AppState;
use crate::domain::{DeviceResponse, Platform};
use crate::errors::AppResult;
use crate::types::{Created, NoContent};

/// Device registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterDeviceRequest {
    /// Push token issued by the platform
    #[validate(length(min = 1, max = 512, message = "Token is required"))]
    pub token: String,
    pub platform: Platform,
}

/// Create device routes
pub fn device_routes() -> Router<AppState> {
    Router::new()
        .route("/devices", get(list_devices).post(register_device))
        .route("/devices/:id", delete(remove_device))
}

/// Devices of the caller
#[utoipa::path(
    get,
    path = "/api/devices",
    tag = "Devices",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Registered devices", body = Vec<DeviceResponse>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_devices(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<DeviceResponse>>> {
    let devices = state.services.devices().my_devices(current.actor()).await?;
    Ok(Json(devices.into_iter().map(DeviceResponse::from).collect()))
}

/// Register a push token for the caller
#[utoipa::path(
    post,
    path = "/api/devices",
    tag = "Devices",
    security(("bearer_auth" = [])),
    request_body = RegisterDeviceRequest,
    responses(
        (status = 201, description = "Device registered", body = DeviceResponse),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn register_device(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterDeviceRequest>,
) -> AppResult<Created<DeviceResponse>> {
    let device = state
        .services
        .devices()
        .register_device(current.actor(), payload.token, payload.platform)
        .await?;
    Ok(Created(DeviceResponse::from(device)))
}

/// Remove one of the caller's devices
#[utoipa::path(
    delete,
    path = "/api/devices/{id}",
    tag = "Devices",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Device ID")
    ),
    responses(
        (status = 204, description = "Device removed"),
        (status = 404, description = "Device not found")
    )
)]
pub async fn remove_device(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state
        .services
        .devices()
        .remove_device(current.actor(), id)
        .await?;
    Ok(NoContent)
}
