//! Authentication service - One-time codes and access tokens.
//!
//! Users and sellers sign in with their phone number: a six digit code is
//! sent by SMS and exchanged once for a JWT.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::SmsSender;
use crate::config::{
    Config, OTP_MESSAGE_TEMPLATE, ROLE_SELLER, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER,
};
use crate::domain::{AccountKind, NewAccount, OneTimePassword, OtpCode};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub kind: AccountKind,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after a successful login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 2592000)]
    pub expires_in: i64,
    pub account_id: Uuid,
    pub kind: AccountKind,
}

/// Confirmation that a code was sent
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OtpSentResponse {
    #[schema(example = "Verification code sent")]
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Issue a code for `phone`, registering the account on first contact.
    async fn generate_otp(&self, kind: AccountKind, phone: String) -> AppResult<OtpSentResponse>;

    /// Exchange a live code for a token. The code is consumed.
    async fn login(&self, kind: AccountKind, phone: String, code: String)
        -> AppResult<TokenResponse>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Verify a token and check that its account may still sign in.
    ///
    /// The returned claims carry the account's current role, not the one
    /// the token was issued with.
    async fn authenticate(&self, token: &str) -> AppResult<Claims>;
}

/// Who a token is issued to
struct Subject {
    id: Uuid,
    kind: AccountKind,
    role: String,
}

fn generate_token(subject: &Subject, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: subject.id,
        kind: subject.kind,
        role: subject.role.clone(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
        account_id: subject.id,
        kind: subject.kind,
    })
}

fn verify_token_internal(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    sms: Arc<dyn SmsSender>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, sms: Arc<dyn SmsSender>, config: Config) -> Self {
        Self { uow, sms, config }
    }

    /// Find or register the account behind `phone`.
    ///
    /// Returns `None` when the account exists but may not sign in.
    async fn resolve_for_code(&self, kind: AccountKind, phone: &str) -> AppResult<Option<Uuid>> {
        match kind {
            AccountKind::User => match self.uow.users().find_by_phone_with_deleted(phone).await? {
                Some(user) => Ok(user.can_login().then_some(user.id)),
                None => {
                    let user = self.uow.users().create(first_contact(phone)).await?;
                    tracing::info!(user_id = %user.id, "User registered by phone");
                    Ok(Some(user.id))
                }
            },
            AccountKind::Seller => match self.uow.sellers().find_by_phone(phone).await? {
                Some(seller) => Ok(seller.can_login().then_some(seller.id)),
                None => {
                    let seller = self.uow.sellers().create(first_contact(phone)).await?;
                    tracing::info!(seller_id = %seller.id, "Seller registered by phone");
                    Ok(Some(seller.id))
                }
            },
        }
    }

    /// Existing account allowed to sign in
    async fn resolve_for_login(&self, kind: AccountKind, phone: &str) -> AppResult<Option<Subject>> {
        let subject = match kind {
            AccountKind::User => self
                .uow
                .users()
                .find_by_phone_with_deleted(phone)
                .await?
                .filter(|u| u.can_login())
                .map(|u| Subject {
                    id: u.id,
                    kind,
                    role: u.role.to_string(),
                }),
            AccountKind::Seller => self
                .uow
                .sellers()
                .find_by_phone(phone)
                .await?
                .filter(|s| s.can_login())
                .map(|s| Subject {
                    id: s.id,
                    kind,
                    role: ROLE_SELLER.to_string(),
                }),
        };
        Ok(subject)
    }

    /// Current role of a token's account, if it may still sign in
    async fn current_role(&self, kind: AccountKind, id: Uuid) -> AppResult<Option<String>> {
        let role = match kind {
            AccountKind::User => self
                .uow
                .users()
                .find_by_id(id)
                .await?
                .filter(|u| u.can_login())
                .map(|u| u.role.to_string()),
            AccountKind::Seller => self
                .uow
                .sellers()
                .find_by_id(id)
                .await?
                .filter(|s| s.can_login())
                .map(|_| ROLE_SELLER.to_string()),
        };
        Ok(role)
    }
}

/// Account created the first time a phone asks for a code
fn first_contact(phone: &str) -> NewAccount {
    NewAccount {
        name: phone.to_string(),
        phone: phone.to_string(),
        ..Default::default()
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn generate_otp(&self, kind: AccountKind, phone: String) -> AppResult<OtpSentResponse> {
        let owner_id = self
            .resolve_for_code(kind, &phone)
            .await?
            .ok_or(AppError::Forbidden)?;

        let (plain, code) = OtpCode::issue()?;
        let expires_at = OneTimePassword::expiry_from(Utc::now(), self.config.otp_ttl_minutes);
        self.uow
            .otps()
            .replace(kind, owner_id, code, expires_at)
            .await?;

        let body = OTP_MESSAGE_TEMPLATE.replace("{code}", &plain);
        self.sms.send(&phone, body).await?;

        tracing::info!(kind = %kind, owner_id = %owner_id, "Verification code issued");
        Ok(OtpSentResponse {
            message: "Verification code sent".to_string(),
            expires_at,
        })
    }

    async fn login(
        &self,
        kind: AccountKind,
        phone: String,
        code: String,
    ) -> AppResult<TokenResponse> {
        let subject = self
            .resolve_for_login(kind, &phone)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let now = Utc::now();
        let otp = self
            .uow
            .otps()
            .find_live(kind, subject.id, now)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !otp.accepts(&code, now) {
            self.uow.otps().record_failure(kind, otp.id).await?;
            tracing::warn!(
                kind = %kind,
                owner_id = %subject.id,
                attempts = otp.attempts + 1,
                "Rejected verification code"
            );
            return Err(AppError::InvalidCredentials);
        }

        // A concurrent login may have used the code in the meantime
        if !self.uow.otps().consume(kind, otp.id, now).await? {
            return Err(AppError::InvalidCredentials);
        }

        generate_token(&subject, &self.config)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token_internal(token, &self.config)
    }

    async fn authenticate(&self, token: &str) -> AppResult<Claims> {
        let mut claims = self.verify_token(token)?;

        match self.current_role(claims.kind, claims.sub).await? {
            Some(role) => {
                claims.role = role;
                Ok(claims)
            }
            None => {
                tracing::warn!(kind = %claims.kind, account_id = %claims.sub, "Token of a disabled account");
                Err(AppError::Unauthorized)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountStatus, Seller, User, UserRole};
    use crate::infra::{MockOtpRepository, MockSellerRepository, MockUserRepository};
    use crate::services::testing::TestUow;
    use crate::services::MockSmsSender;

    const SECRET: &str = "unit-test-secret-that-is-long-enough-123";

    fn user(phone: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: phone.to_string(),
            phone: phone.to_string(),
            email: None,
            image: None,
            status: AccountStatus::Active,
            role: UserRole::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    fn live_otp(owner_id: Uuid, plain: &str) -> OneTimePassword {
        let now = Utc::now();
        OneTimePassword {
            id: Uuid::new_v4(),
            owner_id,
            code: OtpCode::new(plain).unwrap(),
            expires_at: now + Duration::minutes(5),
            consumed_at: None,
            attempts: 0,
            created_at: now,
        }
    }

    fn service(uow: TestUow, sms: MockSmsSender) -> Authenticator<TestUow> {
        Authenticator::new(Arc::new(uow), Arc::new(sms), Config::with_secret(SECRET))
    }

    #[tokio::test]
    async fn test_generate_registers_unknown_phone_and_sends_code() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_phone_with_deleted()
            .returning(|_| Ok(None));
        users
            .expect_create()
            .withf(|account| account.phone == "+99365000001")
            .returning(|account| Ok(user(&account.phone)));

        let mut otps = MockOtpRepository::new();
        otps.expect_replace()
            .times(1)
            .returning(|_, owner_id, code, expires_at| {
                Ok(OneTimePassword {
                    id: Uuid::new_v4(),
                    owner_id,
                    code,
                    expires_at,
                    consumed_at: None,
                    attempts: 0,
                    created_at: Utc::now(),
                })
            });

        let mut sms = MockSmsSender::new();
        sms.expect_send()
            .withf(|phone, body| phone == "+99365000001" && body.contains("code"))
            .times(1)
            .returning(|_, _| Ok(()));

        let uow = TestUow {
            users: Arc::new(users),
            otps: Arc::new(otps),
            ..Default::default()
        };

        let sent = service(uow, sms)
            .generate_otp(AccountKind::User, "+99365000001".to_string())
            .await
            .unwrap();
        assert!(sent.expires_at > Utc::now());
    }

    #[tokio::test]
    async fn test_generate_refuses_blocked_seller() {
        let mut sellers = MockSellerRepository::new();
        sellers.expect_find_by_phone().returning(|phone| {
            Ok(Some(Seller {
                id: Uuid::new_v4(),
                name: "Blocked".to_string(),
                phone: phone.to_string(),
                email: None,
                image: None,
                status: AccountStatus::Blocked,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }))
        });
        let mut sms = MockSmsSender::new();
        sms.expect_send().never();

        let uow = TestUow {
            sellers: Arc::new(sellers),
            ..Default::default()
        };

        let result = service(uow, sms)
            .generate_otp(AccountKind::Seller, "+99361000000".to_string())
            .await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_login_consumes_code_and_issues_token() {
        let account = user("+99365000002");
        let account_id = account.id;

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_phone_with_deleted()
            .returning(move |_| Ok(Some(account.clone())));

        let mut otps = MockOtpRepository::new();
        otps.expect_find_live()
            .returning(|_, owner_id, _| Ok(Some(live_otp(owner_id, "482913"))));
        otps.expect_consume().times(1).returning(|_, _, _| Ok(true));

        let uow = TestUow {
            users: Arc::new(users),
            otps: Arc::new(otps),
            ..Default::default()
        };
        let auth = service(uow, MockSmsSender::new());

        let token = auth
            .login(AccountKind::User, "+99365000002".to_string(), "482913".to_string())
            .await
            .unwrap();
        assert_eq!(token.account_id, account_id);
        assert_eq!(token.token_type, "Bearer");

        let claims = auth.verify_token(&token.access_token).unwrap();
        assert_eq!(claims.sub, account_id);
        assert_eq!(claims.kind, AccountKind::User);
        assert_eq!(claims.role, "user");
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_code_without_consuming() {
        let account = user("+99365000003");
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_phone_with_deleted()
            .returning(move |_| Ok(Some(account.clone())));

        let mut otps = MockOtpRepository::new();
        otps.expect_find_live()
            .returning(|_, owner_id, _| Ok(Some(live_otp(owner_id, "111111"))));
        otps.expect_consume().never();
        otps.expect_record_failure()
            .withf(|kind, _| *kind == AccountKind::User)
            .times(1)
            .returning(|_, _| Ok(()));

        let uow = TestUow {
            users: Arc::new(users),
            otps: Arc::new(otps),
            ..Default::default()
        };

        let result = service(uow, MockSmsSender::new())
            .login(AccountKind::User, "+99365000003".to_string(), "222222".to_string())
            .await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_rejects_already_consumed_code() {
        let account = user("+99365000004");
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_phone_with_deleted()
            .returning(move |_| Ok(Some(account.clone())));

        let mut otps = MockOtpRepository::new();
        otps.expect_find_live()
            .returning(|_, owner_id, _| Ok(Some(live_otp(owner_id, "333333"))));
        otps.expect_consume().returning(|_, _, _| Ok(false));

        let uow = TestUow {
            users: Arc::new(users),
            otps: Arc::new(otps),
            ..Default::default()
        };

        let result = service(uow, MockSmsSender::new())
            .login(AccountKind::User, "+99365000004".to_string(), "333333".to_string())
            .await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_soft_deleted_user_cannot_login() {
        let mut account = user("+99365000005");
        account.deleted_at = Some(Utc::now());
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_phone_with_deleted()
            .returning(move |_| Ok(Some(account.clone())));
        let mut otps = MockOtpRepository::new();
        otps.expect_find_live().never();

        let uow = TestUow {
            users: Arc::new(users),
            otps: Arc::new(otps),
            ..Default::default()
        };

        let result = service(uow, MockSmsSender::new())
            .login(AccountKind::User, "+99365000005".to_string(), "123456".to_string())
            .await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_exhausted_code_is_refused_even_when_right() {
        let account = user("+99365000006");
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_phone_with_deleted()
            .returning(move |_| Ok(Some(account.clone())));

        let mut otps = MockOtpRepository::new();
        otps.expect_find_live().returning(|_, owner_id, _| {
            let mut otp = live_otp(owner_id, "444444");
            otp.attempts = crate::config::OTP_MAX_ATTEMPTS;
            Ok(Some(otp))
        });
        otps.expect_record_failure().returning(|_, _| Ok(()));
        otps.expect_consume().never();

        let uow = TestUow {
            users: Arc::new(users),
            otps: Arc::new(otps),
            ..Default::default()
        };

        let result = service(uow, MockSmsSender::new())
            .login(AccountKind::User, "+99365000006".to_string(), "444444".to_string())
            .await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    fn token_for(id: Uuid, kind: AccountKind, role: &str) -> String {
        let subject = Subject {
            id,
            kind,
            role: role.to_string(),
        };
        generate_token(&subject, &Config::with_secret(SECRET))
            .unwrap()
            .access_token
    }

    #[tokio::test]
    async fn test_authenticate_refuses_soft_deleted_user() {
        let id = Uuid::new_v4();
        let mut users = MockUserRepository::new();
        // Soft-deleted rows are invisible to find_by_id
        users.expect_find_by_id().returning(|_| Ok(None));

        let uow = TestUow {
            users: Arc::new(users),
            ..Default::default()
        };
        let auth = service(uow, MockSmsSender::new());
        let token = token_for(id, AccountKind::User, "user");

        assert!(auth.verify_token(&token).is_ok());
        assert!(matches!(
            auth.authenticate(&token).await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_authenticate_refuses_blocked_user() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| {
            let mut blocked = user("+99365000007");
            blocked.id = id;
            blocked.status = AccountStatus::Blocked;
            Ok(Some(blocked))
        });

        let uow = TestUow {
            users: Arc::new(users),
            ..Default::default()
        };
        let token = token_for(Uuid::new_v4(), AccountKind::User, "user");
        let result = service(uow, MockSmsSender::new())
            .authenticate(&token)
            .await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_authenticate_uses_current_role() {
        let id = Uuid::new_v4();
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| {
            let mut demoted = user("+99365000008");
            demoted.id = id;
            demoted.role = UserRole::User;
            Ok(Some(demoted))
        });

        let uow = TestUow {
            users: Arc::new(users),
            ..Default::default()
        };
        let token = token_for(id, AccountKind::User, "admin");
        let claims = service(uow, MockSmsSender::new())
            .authenticate(&token)
            .await
            .unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, "user");
    }

    #[tokio::test]
    async fn test_authenticate_refuses_blocked_seller() {
        let mut sellers = MockSellerRepository::new();
        sellers.expect_find_by_id().returning(|id| {
            Ok(Some(Seller {
                id,
                name: "Blocked".to_string(),
                phone: "+99361000001".to_string(),
                email: None,
                image: None,
                status: AccountStatus::Blocked,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }))
        });

        let uow = TestUow {
            sellers: Arc::new(sellers),
            ..Default::default()
        };
        let token = token_for(Uuid::new_v4(), AccountKind::Seller, ROLE_SELLER);
        let result = service(uow, MockSmsSender::new())
            .authenticate(&token)
            .await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let auth = service(TestUow::default(), MockSmsSender::new());
        assert!(auth.verify_token("not.a.token").is_err());
    }
}
