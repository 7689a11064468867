//! Account entities: users and sellers.
//!
//! Both kinds authenticate with one-time codes sent to their phone.
//! Users may own shops and can be soft deleted; sellers are removed outright.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::config::{
    ACCOUNT_KIND_SELLER, ACCOUNT_KIND_USER, ROLE_ADMIN, ROLE_USER, STATUS_ACTIVE, STATUS_BLOCKED,
};

/// Which account table a token or code belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    User,
    Seller,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::User => ACCOUNT_KIND_USER,
            AccountKind::Seller => ACCOUNT_KIND_SELLER,
        }
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Blocked,
}

impl AccountStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, AccountStatus::Active)
    }
}

impl From<&str> for AccountStatus {
    fn from(s: &str) -> Self {
        match s {
            STATUS_BLOCKED => AccountStatus::Blocked,
            _ => AccountStatus::Active,
        }
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountStatus::Active => write!(f, "{}", STATUS_ACTIVE),
            AccountStatus::Blocked => write!(f, "{}", STATUS_BLOCKED),
        }
    }
}

/// User roles enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => UserRole::Admin,
            _ => UserRole::User,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "{}", ROLE_ADMIN),
            UserRole::User => write!(f, "{}", ROLE_USER),
        }
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub image: Option<String>,
    pub status: AccountStatus,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft delete timestamp (None = active, Some = deleted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Active and not soft deleted
    pub fn can_login(&self) -> bool {
        self.status.is_active() && !self.is_deleted()
    }
}

/// Seller domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seller {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub image: Option<String>,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Seller {
    pub fn can_login(&self) -> bool {
        self.status.is_active()
    }
}

/// Authenticated caller as seen by the services
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub kind: AccountKind,
    pub admin: bool,
}

impl Actor {
    pub fn is_user(&self) -> bool {
        self.kind == AccountKind::User
    }

    /// The caller is the given user, or an administrator.
    pub fn is_self_or_admin(&self, user_id: Uuid) -> bool {
        self.admin || (self.is_user() && self.id == user_id)
    }
}

/// Fields accepted when an account is created
#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub image: Option<String>,
    pub status: Option<AccountStatus>,
    pub role: Option<UserRole>,
}

/// Partial account update; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    pub status: Option<AccountStatus>,
    pub role: Option<UserRole>,
}

/// Account listing filters. The deleted flags only apply to users.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AccountFilter {
    /// Case-insensitive match on name, phone or email
    pub search: Option<String>,
    /// Include soft deleted users
    #[serde(default)]
    pub with_deleted: bool,
    /// Only soft deleted users
    #[serde(default)]
    pub only_deleted: bool,
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "Aman Amanov")]
    pub name: String,
    #[schema(example = "+99365123456")]
    pub phone: String,
    #[schema(example = "aman@example.com")]
    pub email: Option<String>,
    #[schema(example = "/storage/users/aman-amanov/0b9c.png")]
    pub image: Option<String>,
    #[schema(example = "active")]
    pub status: String,
    #[schema(example = "user")]
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            phone: user.phone,
            email: user.email,
            image: user.image,
            status: user.status.to_string(),
            role: user.role.to_string(),
            created_at: user.created_at,
            deleted_at: user.deleted_at,
        }
    }
}

/// Seller response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SellerResponse {
    pub id: Uuid,
    #[schema(example = "Merdan Bazarov")]
    pub name: String,
    #[schema(example = "+99361234567")]
    pub phone: String,
    pub email: Option<String>,
    pub image: Option<String>,
    #[schema(example = "active")]
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Seller> for SellerResponse {
    fn from(seller: Seller) -> Self {
        Self {
            id: seller.id,
            name: seller.name,
            phone: seller.phone,
            email: seller.email,
            image: seller.image,
            status: seller.status.to_string(),
            created_at: seller.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            phone: "+99365000000".to_string(),
            email: None,
            image: None,
            status: AccountStatus::Active,
            role: UserRole::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_status_round_trip_strings() {
        assert_eq!(AccountStatus::from("blocked"), AccountStatus::Blocked);
        assert_eq!(AccountStatus::from("active"), AccountStatus::Active);
        assert_eq!(AccountStatus::from("unknown"), AccountStatus::Active);
        assert_eq!(AccountStatus::Blocked.to_string(), "blocked");
    }

    #[test]
    fn test_blocked_or_deleted_user_cannot_login() {
        let mut u = user();
        assert!(u.can_login());

        u.status = AccountStatus::Blocked;
        assert!(!u.can_login());

        u.status = AccountStatus::Active;
        u.deleted_at = Some(Utc::now());
        assert!(!u.can_login());
    }

    #[test]
    fn test_actor_ownership() {
        let id = Uuid::new_v4();
        let user = Actor {
            id,
            kind: AccountKind::User,
            admin: false,
        };
        assert!(user.is_self_or_admin(id));
        assert!(!user.is_self_or_admin(Uuid::new_v4()));

        // A seller sharing the id is still not that user
        let seller = Actor {
            kind: AccountKind::Seller,
            ..user
        };
        assert!(!seller.is_self_or_admin(id));

        let admin = Actor { admin: true, ..user };
        assert!(admin.is_self_or_admin(Uuid::new_v4()));
    }

    #[test]
    fn test_user_response_renders_role_and_status() {
        let mut u = user();
        u.role = UserRole::Admin;
        let response = UserResponse::from(u);
        assert_eq!(response.role, "admin");
        assert_eq!(response.status, "active");
    }
}
