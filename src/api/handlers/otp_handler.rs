//! One-time code sign-in for users and sellers.

use axum::{extract::State, response::Json, routing::post, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::AccountKind;
use crate::errors::AppResult;
use crate::services::{OtpSentResponse, TokenResponse};
use crate::utils::PHONE_REGEX;

/// Request a code for a phone number
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenerateOtpRequest {
    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number"))]
    #[schema(example = "+99365123456")]
    pub phone: String,
}

/// Exchange a code for an access token
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct OtpLoginRequest {
    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number"))]
    #[schema(example = "+99365123456")]
    pub phone: String,
    #[validate(length(equal = 6, message = "Code must have 6 digits"))]
    #[schema(example = "123456")]
    pub code: String,
}

/// Create the user and seller sign-in routes
pub fn otp_routes() -> Router<AppState> {
    Router::new()
        .route("/otp/generate", post(generate_user_otp))
        .route("/otp/login", post(user_login))
        .route("/seller/otp/generate", post(generate_seller_otp))
        .route("/seller/otp/login", post(seller_login))
}

/// Send a sign-in code to a user
#[utoipa::path(
    post,
    path = "/api/otp/generate",
    tag = "Authentication",
    request_body = GenerateOtpRequest,
    responses(
        (status = 200, description = "Code sent", body = OtpSentResponse),
        (status = 403, description = "Account blocked"),
        (status = 422, description = "Validation error"),
        (status = 429, description = "Too many requests")
    )
)]
pub async fn generate_user_otp(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<GenerateOtpRequest>,
) -> AppResult<Json<OtpSentResponse>> {
    let sent = state
        .services
        .auth()
        .generate_otp(AccountKind::User, payload.phone)
        .await?;
    Ok(Json(sent))
}

/// Sign a user in with a code
#[utoipa::path(
    post,
    path = "/api/otp/login",
    tag = "Authentication",
    request_body = OtpLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Wrong or expired code"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn user_login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<OtpLoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state
        .services
        .auth()
        .login(AccountKind::User, payload.phone, payload.code)
        .await?;
    Ok(Json(token))
}

/// Send a sign-in code to a seller
#[utoipa::path(
    post,
    path = "/api/seller/otp/generate",
    tag = "Authentication",
    request_body = GenerateOtpRequest,
    responses(
        (status = 200, description = "Code sent", body = OtpSentResponse),
        (status = 403, description = "Account blocked"),
        (status = 422, description = "Validation error"),
        (status = 429, description = "Too many requests")
    )
)]
pub async fn generate_seller_otp(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<GenerateOtpRequest>,
) -> AppResult<Json<OtpSentResponse>> {
    let sent = state
        .services
        .auth()
        .generate_otp(AccountKind::Seller, payload.phone)
        .await?;
    Ok(Json(sent))
}

/// Sign a seller in with a code
#[utoipa::path(
    post,
    path = "/api/seller/otp/login",
    tag = "Authentication",
    request_body = OtpLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Wrong or expired code"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn seller_login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<OtpLoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state
        .services
        .auth()
        .login(AccountKind::Seller, payload.phone, payload.code)
        .await?;
    Ok(Json(token))
}
