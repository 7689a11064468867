//! Application route configuration.

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    catalog_public_routes, catalog_routes, category_public_routes, category_routes,
    device_routes, otp_routes, product_public_routes, product_routes, region_public_routes,
    region_routes, seller_routes, shop_public_routes, shop_routes, user_routes,
};
use super::middleware::{auth_middleware, rate_limit_middleware, rate_limit_otp_middleware};
use super::openapi::ApiDoc;
use super::AppState;
use crate::config::BODY_LIMIT_FACTOR;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    // Sign-in routes (stricter rate limiting)
    let otp = otp_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        rate_limit_otp_middleware,
    ));

    // Public reads (general rate limiting)
    let public = Router::new()
        .merge(region_public_routes())
        .merge(shop_public_routes())
        .merge(category_public_routes())
        .merge(catalog_public_routes())
        .merge(product_public_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    // Protected routes (require JWT + general rate limiting)
    let protected = Router::new()
        .merge(user_routes())
        .merge(seller_routes())
        .merge(region_routes())
        .merge(shop_routes())
        .merge(category_routes())
        .merge(catalog_routes())
        .merge(product_routes())
        .merge(device_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    let body_limit = state.config.max_image_bytes.saturating_mul(BODY_LIMIT_FACTOR);
    let api = Router::new()
        .merge(otp)
        .merge(public)
        .merge(protected)
        .layer(DefaultBodyLimit::max(body_limit));

    Router::new()
        // Health check endpoints (no rate limiting)
        .route("/", get(root))
        .route("/health", get(health))
        // OpenAPI Swagger UI documentation
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api)
        // Uploaded images
        .nest_service(
            &state.config.storage_url,
            ServeDir::new(&state.config.storage_root),
        )
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Welcome to Market API"
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    services: ServiceHealth,
}

/// Individual service health status
#[derive(Serialize)]
struct ServiceHealth {
    database: ServiceStatus,
    redis: ServiceStatus,
}

/// Service status
#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ServiceStatus {
    fn from_ping<E: ToString>(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self {
                status: "healthy",
                error: None,
            },
            Err(e) => Self {
                status: "unhealthy",
                error: Some(e.to_string()),
            },
        }
    }

    fn is_healthy(&self) -> bool {
        self.error.is_none()
    }
}

/// Health check endpoint with database and Redis connectivity check
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (database, redis) = tokio::join!(state.database.ping(), state.cache.ping());
    let database = ServiceStatus::from_ping(database);
    let redis = ServiceStatus::from_ping(redis);

    let all_healthy = database.is_healthy() && redis.is_healthy();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" },
        services: ServiceHealth { database, redis },
    };

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
