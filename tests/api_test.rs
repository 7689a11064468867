//! Integration tests for API endpoints.
//!
//! These tests drive the real router with stub services, so no database
//! or Redis connection is needed.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use market_api::api::{create_router, AppState};
use market_api::config::{Config, ROLE_ADMIN, ROLE_USER};
use market_api::domain::{
    AccountChanges, AccountFilter, AccountKind, AccountStatus, Actor, Address, AddressInput,
    ImageSource, NewAccount, Product, ProductDraft, ProductFilter, ProductImage, ProductPatch,
    ProductResponse, Region, RegionFilter, RegionInput, RegionResponse, User, UserRole,
};
use market_api::errors::{AppError, AppResult};
use market_api::infra::{Pingable, RateLimitStore};
use market_api::services::{
    AuthService, CatalogService, CategoryService, Claims, DeviceService, OtpSentResponse,
    ProductService, RegionService, SellerService, ServiceContainer, ShopService, TokenResponse,
    UserService,
};
use market_api::types::{Paginated, PaginationParams};

const USER_TOKEN: &str = "user-token";
const ADMIN_TOKEN: &str = "admin-token";
/// Validly signed, but the account was soft-deleted afterwards
const DELETED_TOKEN: &str = "deleted-token";
/// Carries an admin claim, but the account has since been demoted
const DEMOTED_TOKEN: &str = "demoted-token";

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

// =============================================================================
// Stub Services for Testing
// =============================================================================

/// Accepts a handful of fixed tokens
struct StubAuth {
    user_id: Uuid,
    admin_id: Uuid,
    deleted_id: Uuid,
    demoted_id: Uuid,
}

#[async_trait]
impl AuthService for StubAuth {
    async fn generate_otp(&self, _kind: AccountKind, _phone: String) -> AppResult<OtpSentResponse> {
        Ok(OtpSentResponse {
            message: "Verification code sent".to_string(),
            expires_at: Utc::now(),
        })
    }

    async fn login(
        &self,
        kind: AccountKind,
        _phone: String,
        code: String,
    ) -> AppResult<TokenResponse> {
        if code != "123456" {
            return Err(AppError::InvalidCredentials);
        }
        Ok(TokenResponse {
            access_token: USER_TOKEN.to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 3600,
            account_id: self.user_id,
            kind,
        })
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let (sub, role) = match token {
            USER_TOKEN => (self.user_id, ROLE_USER),
            ADMIN_TOKEN => (self.admin_id, ROLE_ADMIN),
            DELETED_TOKEN => (self.deleted_id, ROLE_USER),
            DEMOTED_TOKEN => (self.demoted_id, ROLE_ADMIN),
            _ => return Err(AppError::Unauthorized),
        };
        Ok(Claims {
            sub,
            kind: AccountKind::User,
            role: role.to_string(),
            exp: Utc::now().timestamp() + 3600,
            iat: Utc::now().timestamp(),
        })
    }

    async fn authenticate(&self, token: &str) -> AppResult<Claims> {
        let mut claims = self.verify_token(token)?;
        if claims.sub == self.deleted_id {
            return Err(AppError::Unauthorized);
        }
        if claims.sub == self.demoted_id {
            claims.role = ROLE_USER.to_string();
        }
        Ok(claims)
    }
}

fn test_user(id: Uuid) -> User {
    User {
        id,
        name: "Test User".to_string(),
        phone: "+99365123456".to_string(),
        email: None,
        image: None,
        status: AccountStatus::Active,
        role: UserRole::User,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        deleted_at: None,
    }
}

/// Knows every user id it is asked about
struct StubUsers;

#[async_trait]
impl UserService for StubUsers {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        Ok(test_user(id))
    }

    async fn get_user_with_deleted(&self, id: Uuid) -> AppResult<User> {
        self.get_user(id).await
    }

    async fn list_users(
        &self,
        _filter: AccountFilter,
        params: PaginationParams,
    ) -> AppResult<Paginated<User>> {
        Ok(Paginated::from_page(vec![test_user(Uuid::new_v4())], &params, 1))
    }

    async fn create_user(&self, account: NewAccount, _image: Option<String>) -> AppResult<User> {
        Ok(User {
            name: account.name,
            phone: account.phone,
            ..test_user(Uuid::new_v4())
        })
    }

    async fn update_user(
        &self,
        id: Uuid,
        changes: AccountChanges,
        _image: Option<String>,
    ) -> AppResult<User> {
        let mut user = test_user(id);
        if let Some(name) = changes.name {
            user.name = name;
        }
        Ok(user)
    }

    async fn delete_user(&self, _id: Uuid) -> AppResult<()> {
        Ok(())
    }

    async fn hard_delete_user(&self, _id: Uuid) -> AppResult<()> {
        Ok(())
    }

    async fn restore_user(&self, id: Uuid) -> AppResult<User> {
        self.get_user(id).await
    }
}

/// No regions exist; creates echo the input
struct StubRegions;

#[async_trait]
impl RegionService for StubRegions {
    async fn list_regions(&self, _filter: RegionFilter) -> AppResult<Vec<Region>> {
        Ok(vec![])
    }

    async fn region_tree(&self) -> AppResult<Vec<RegionResponse>> {
        Ok(vec![])
    }

    async fn get_region(&self, _id: Uuid) -> AppResult<RegionResponse> {
        Err(AppError::NotFound)
    }

    async fn create_region(&self, input: RegionInput) -> AppResult<Region> {
        Ok(Region {
            id: Uuid::new_v4(),
            parent_id: input.parent_id,
            kind: input.kind,
            name_tm: input.name_tm,
            name_en: input.name_en,
            name_ru: input.name_ru,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
    }

    async fn update_region(&self, _id: Uuid, _input: RegionInput) -> AppResult<Region> {
        Err(AppError::NotFound)
    }

    async fn delete_region(&self, _id: Uuid) -> AppResult<()> {
        Err(AppError::conflict("Region still has children"))
    }

    async fn upsert_address(&self, _id: Uuid, _input: AddressInput) -> AppResult<Address> {
        Err(AppError::NotFound)
    }

    async fn remove_address(&self, _id: Uuid) -> AppResult<()> {
        Err(AppError::NotFound)
    }
}

/// No stored products; creates echo the draft
struct StubProducts;

#[async_trait]
impl ProductService for StubProducts {
    async fn list_products(
        &self,
        _filter: ProductFilter,
        params: PaginationParams,
    ) -> AppResult<Paginated<Product>> {
        Ok(Paginated::from_page(vec![], &params, 0))
    }

    async fn get_product(&self, _id: Uuid) -> AppResult<ProductResponse> {
        Err(AppError::NotFound)
    }

    async fn create_product(&self, _actor: Actor, draft: ProductDraft) -> AppResult<ProductResponse> {
        let new = draft.product;
        Ok(ProductResponse::from(Product {
            id: Uuid::new_v4(),
            category_id: new.category_id,
            shop_id: new.shop_id,
            name_tm: new.name_tm,
            name_en: new.name_en,
            name_ru: new.name_ru,
            slug: "apple-juice".to_string(),
            description: new.description,
            pricing: new.pricing,
            stock: new.stock,
            status: new.status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }))
    }

    async fn update_product(
        &self,
        _actor: Actor,
        _id: Uuid,
        _patch: ProductPatch,
    ) -> AppResult<ProductResponse> {
        Err(AppError::NotFound)
    }

    async fn delete_product(&self, _actor: Actor, _id: Uuid) -> AppResult<()> {
        Err(AppError::NotFound)
    }

    async fn add_image(
        &self,
        _actor: Actor,
        id: Uuid,
        source: ImageSource,
    ) -> AppResult<ProductImage> {
        match source {
            ImageSource::Bytes(bytes) if bytes.starts_with(&PNG_MAGIC) => Ok(ProductImage {
                id: Uuid::new_v4(),
                product_id: id,
                path: "/storage/products/apple-juice/a.png".to_string(),
                position: 0,
                created_at: Utc::now(),
            }),
            _ => Err(AppError::validation("Unsupported image")),
        }
    }

    async fn remove_image(&self, _actor: Actor, _id: Uuid, _image_id: Uuid) -> AppResult<()> {
        Err(AppError::NotFound)
    }
}

struct StubContainer {
    auth: Arc<StubAuth>,
}

impl ServiceContainer for StubContainer {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        Arc::new(StubUsers)
    }

    fn sellers(&self) -> Arc<dyn SellerService> {
        unimplemented!("sellers are not exercised here")
    }

    fn regions(&self) -> Arc<dyn RegionService> {
        Arc::new(StubRegions)
    }

    fn shops(&self) -> Arc<dyn ShopService> {
        unimplemented!("shops are not exercised here")
    }

    fn categories(&self) -> Arc<dyn CategoryService> {
        unimplemented!("categories are not exercised here")
    }

    fn catalog(&self) -> Arc<dyn CatalogService> {
        unimplemented!("catalog is not exercised here")
    }

    fn products(&self) -> Arc<dyn ProductService> {
        Arc::new(StubProducts)
    }

    fn devices(&self) -> Arc<dyn DeviceService> {
        unimplemented!("devices are not exercised here")
    }
}

/// Rate limiter that always allows or always denies, remembering each key
struct StubLimiter {
    allow: bool,
    keys: Mutex<Vec<String>>,
}

#[async_trait]
impl RateLimitStore for StubLimiter {
    async fn hit(
        &self,
        identifier: &str,
        max_requests: u64,
        _window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        self.keys.lock().unwrap().push(identifier.to_string());
        if self.allow {
            Ok((1, true))
        } else {
            Ok((max_requests + 1, false))
        }
    }
}

struct StubPing {
    up: bool,
}

#[async_trait]
impl Pingable for StubPing {
    async fn ping(&self) -> AppResult<()> {
        if self.up {
            Ok(())
        } else {
            Err(AppError::internal("connection refused"))
        }
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

struct TestApp {
    router: Router,
    user_id: Uuid,
    limiter: Arc<StubLimiter>,
}

fn test_config() -> Config {
    Config::with_secret("test-secret-key-for-testing-only-32chars")
}

fn build_app(allow_requests: bool, database_up: bool) -> TestApp {
    build_app_with(allow_requests, database_up, test_config())
}

fn build_app_with(allow_requests: bool, database_up: bool, config: Config) -> TestApp {
    let user_id = Uuid::new_v4();
    let services = StubContainer {
        auth: Arc::new(StubAuth {
            user_id,
            admin_id: Uuid::new_v4(),
            deleted_id: Uuid::new_v4(),
            demoted_id: Uuid::new_v4(),
        }),
    };
    let limiter = Arc::new(StubLimiter {
        allow: allow_requests,
        keys: Mutex::new(Vec::new()),
    });
    let state = AppState::new(
        Arc::new(services),
        limiter.clone(),
        Arc::new(StubPing { up: database_up }),
        Arc::new(StubPing { up: true }),
        config,
    );
    TestApp {
        router: create_router(state),
        user_id,
        limiter,
    }
}

fn app() -> TestApp {
    build_app(true, true)
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

// =============================================================================
// Root and Health
// =============================================================================

#[tokio::test]
async fn test_root_endpoint_returns_welcome_message() {
    let response = app()
        .router
        .oneshot(request(Method::GET, "/", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"Welcome to Market API");
}

#[tokio::test]
async fn test_health_reports_healthy() {
    let (status, body) = send(app().router, request(Method::GET, "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_health_degraded_when_database_down() {
    let app = build_app(true, false);
    let (status, body) = send(app.router, request(Method::GET, "/health", None, None)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["services"]["database"]["status"], "unhealthy");
    assert_eq!(body["services"]["redis"]["status"], "healthy");
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_protected_route_requires_token() {
    let (status, body) =
        send(app().router, request(Method::GET, "/api/users/me", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_unknown_token_is_rejected() {
    let (status, _) = send(
        app().router,
        request(Method::GET, "/api/users/me", Some("forged"), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_deleted_account_token_is_rejected() {
    let (status, _) = send(
        app().router,
        request(Method::GET, "/api/users/me", Some(DELETED_TOKEN), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_current_user_profile() {
    let app = app();
    let user_id = app.user_id;
    let (status, body) = send(
        app.router,
        request(Method::GET, "/api/users/me", Some(USER_TOKEN), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], user_id.to_string());
}

#[tokio::test]
async fn test_otp_login_returns_token() {
    let (status, body) = send(
        app().router,
        request(
            Method::POST,
            "/api/otp/login",
            None,
            Some(json!({ "phone": "+99365123456", "code": "123456" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["access_token"], USER_TOKEN);
    assert_eq!(body["kind"], "user");
}

#[tokio::test]
async fn test_otp_generate_rejects_bad_phone() {
    let (status, body) = send(
        app().router,
        request(
            Method::POST,
            "/api/seller/otp/generate",
            None,
            Some(json!({ "phone": "65123456" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]["fields"]["phone"].is_array());
}

// =============================================================================
// Authorization
// =============================================================================

#[tokio::test]
async fn test_user_list_is_admin_only() {
    let (status, _) = send(
        app().router,
        request(Method::GET, "/api/users", Some(USER_TOKEN), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_demoted_admin_token_loses_admin_routes() {
    let (status, _) = send(
        app().router,
        request(Method::GET, "/api/users", Some(DEMOTED_TOKEN), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_lists_users_with_meta() {
    let (status, body) = send(
        app().router,
        request(Method::GET, "/api/users?page=1&per_page=500", Some(ADMIN_TOKEN), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["meta"]["per_page"], 100);
}

#[tokio::test]
async fn test_user_cannot_update_someone_else() {
    let uri = format!("/api/users/{}", Uuid::new_v4());
    let (status, _) = send(
        app().router,
        request(Method::PUT, &uri, Some(USER_TOKEN), Some(json!({ "name": "X" }))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_user_cannot_promote_self() {
    let app = app();
    let uri = format!("/api/users/{}", app.user_id);
    let (status, _) = send(
        app.router,
        request(Method::PUT, &uri, Some(USER_TOKEN), Some(json!({ "role": "admin" }))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// =============================================================================
// Regions
// =============================================================================

#[tokio::test]
async fn test_public_read_of_unknown_region_is_404() {
    let uri = format!("/api/regions/{}", Uuid::new_v4());
    let (status, body) = send(app().router, request(Method::GET, &uri, None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_region_write_requires_token() {
    let (status, _) = send(
        app().router,
        request(
            Method::POST,
            "/api/regions",
            None,
            Some(json!({ "kind": "country", "name_tm": "a", "name_en": "b", "name_ru": "c" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_creates_region() {
    let (status, body) = send(
        app().router,
        request(
            Method::POST,
            "/api/regions",
            Some(ADMIN_TOKEN),
            Some(json!({
                "kind": "country",
                "name_tm": "Türkmenistan",
                "name_en": "Turkmenistan",
                "name_ru": "Туркменистан"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name_en"], "Turkmenistan");
    assert_eq!(body["kind"], "country");
}

#[tokio::test]
async fn test_invalid_region_payload_returns_field_map() {
    let (status, body) = send(
        app().router,
        request(
            Method::POST,
            "/api/regions",
            Some(ADMIN_TOKEN),
            Some(json!({ "kind": "country", "name_tm": "", "name_en": "x", "name_ru": "" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields = &body["error"]["fields"];
    assert!(fields["name_tm"].is_array());
    assert!(fields["name_ru"].is_array());
    assert!(fields.get("name_en").is_none());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/regions")
        .header(header::AUTHORIZATION, format!("Bearer {}", ADMIN_TOKEN))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(app().router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_region_delete_conflict() {
    let uri = format!("/api/regions/{}", Uuid::new_v4());
    let (status, body) = send(
        app().router,
        request(Method::DELETE, &uri, Some(ADMIN_TOKEN), None),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn test_create_product_returns_201() {
    let shop_id = Uuid::new_v4();
    let (status, body) = send(
        app().router,
        request(
            Method::POST,
            "/api/products",
            Some(USER_TOKEN),
            Some(json!({
                "category_id": Uuid::new_v4(),
                "shop_id": shop_id,
                "name_tm": "Alma şiresi",
                "name_en": "Apple juice",
                "name_ru": "Яблочный сок",
                "price": 1250,
                "discount_price": 1000,
                "stock": 40,
                "compositions": [
                    { "composition_id": Uuid::new_v4(), "qty": 12.5, "qty_type": "gram" }
                ]
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["shop_id"], shop_id.to_string());
    assert_eq!(body["price"], 1250);
    assert_eq!(body["discount_price"], 1000);
    assert_eq!(body["status"], true);
}

#[tokio::test]
async fn test_create_product_requires_token() {
    let (status, _) = send(
        app().router,
        request(Method::POST, "/api/products", None, Some(json!({}))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_product_is_404() {
    let uri = format!("/api/products/{}", Uuid::new_v4());
    let (status, body) = send(app().router, request(Method::GET, &uri, None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

fn multipart_image(uri: &str, field: &str, file: &[u8]) -> Request<Body> {
    let boundary = "market-api-boundary";
    let mut body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"a.png\"\r\n\
         Content-Type: image/png\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(file);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", USER_TOKEN))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_multipart_image_upload() {
    let uri = format!("/api/products/{}/images", Uuid::new_v4());
    let mut png = PNG_MAGIC.to_vec();
    png.extend_from_slice(&[0, 0, 0, 13]);

    let (status, body) = send(app().router, multipart_image(&uri, "image", &png)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["path"], "/storage/products/apple-juice/a.png");
    assert_eq!(body["position"], 0);
}

#[tokio::test]
async fn test_multipart_without_image_field() {
    let uri = format!("/api/products/{}/images", Uuid::new_v4());
    let (status, body) = send(app().router, multipart_image(&uri, "photo", &PNG_MAGIC)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]["fields"]["image"].is_array());
}

// =============================================================================
// Rate Limiting
// =============================================================================

#[tokio::test]
async fn test_rate_limited_requests_get_429() {
    let app = build_app(false, true);
    let response = app
        .router
        .oneshot(request(Method::GET, "/api/regions", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("Retry-After"));
}

fn from_peer(peer: &str, forwarded: &str) -> Request<Body> {
    let mut request = request(Method::GET, "/api/regions/tree", None, None);
    request
        .headers_mut()
        .insert("X-Forwarded-For", forwarded.parse().unwrap());
    let peer: SocketAddr = peer.parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));
    request
}

#[tokio::test]
async fn test_spoofed_forwarded_for_keeps_peer_bucket() {
    let app = app();
    for forged in ["6.6.6.6", "7.7.7.7"] {
        let response = app
            .router
            .clone()
            .oneshot(from_peer("10.0.0.7:41000", forged))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert_eq!(
        *app.limiter.keys.lock().unwrap(),
        vec!["general:10.0.0.7".to_string(), "general:10.0.0.7".to_string()]
    );
}

#[tokio::test]
async fn test_forwarded_for_used_behind_trusted_proxy() {
    let mut config = test_config();
    config.trust_proxy = true;
    let app = build_app_with(true, true, config);
    let response = app
        .router
        .oneshot(from_peer("10.0.0.7:41000", "203.0.113.9, 10.0.0.1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        *app.limiter.keys.lock().unwrap(),
        vec!["general:203.0.113.9".to_string()]
    );
}

#[tokio::test]
async fn test_allowed_requests_carry_limit_headers() {
    let response = app()
        .router
        .oneshot(request(Method::GET, "/api/regions/tree", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("X-RateLimit-Limit"));
}

// =============================================================================
// Documentation
// =============================================================================

#[tokio::test]
async fn test_openapi_document_served() {
    let (status, body) = send(
        app().router,
        request(Method::GET, "/api-docs/openapi.json", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/products/{id}/images"].is_object());
}
