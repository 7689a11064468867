//! JWT authentication middleware.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::api::AppState;
use crate::config::{BEARER_TOKEN_PREFIX, ROLE_ADMIN};
use crate::domain::{AccountKind, Actor};
use crate::errors::AppError;

/// Authenticated user or seller extracted from JWT token
#[derive(Clone, Debug)]
pub struct CurrentAccount {
    pub id: Uuid,
    pub kind: AccountKind,
    pub role: String,
}

impl CurrentAccount {
    /// Only users carry the admin role.
    pub fn is_admin(&self) -> bool {
        self.kind == AccountKind::User && self.role == ROLE_ADMIN
    }

    /// The caller as seen by the services
    pub fn actor(&self) -> Actor {
        Actor {
            id: self.id,
            kind: self.kind,
            admin: self.is_admin(),
        }
    }
}

/// JWT authentication middleware.
///
/// Extracts and validates the JWT token from the Authorization header,
/// resolves the account behind it (deleted, blocked or unknown accounts
/// get 401) and injects the CurrentAccount with its current role into
/// the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix(BEARER_TOKEN_PREFIX)
        .ok_or(AppError::Unauthorized)?;

    let claims = state.services.auth().authenticate(token).await?;

    let current = CurrentAccount {
        id: claims.sub,
        kind: claims.kind,
        role: claims.role,
    };

    request.extensions_mut().insert(current);

    Ok(next.run(request).await)
}

/// Require admin role, returns Forbidden error if not admin.
pub fn require_admin(account: &CurrentAccount) -> Result<(), AppError> {
    if account.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

pub fn require_user(account: &CurrentAccount) -> Result<(), AppError> {
    match account.kind {
        AccountKind::User => Ok(()),
        AccountKind::Seller => Err(AppError::Forbidden),
    }
}

pub fn require_seller(account: &CurrentAccount) -> Result<(), AppError> {
    match account.kind {
        AccountKind::Seller => Ok(()),
        AccountKind::User => Err(AppError::Forbidden),
    }
}

/// The caller is the given user, or an admin.
pub fn require_self_or_admin(account: &CurrentAccount, user_id: Uuid) -> Result<(), AppError> {
    if account.actor().is_self_or_admin(user_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ROLE_SELLER;

    #[test]
    fn test_seller_is_never_admin() {
        let seller = CurrentAccount {
            id: Uuid::new_v4(),
            kind: AccountKind::Seller,
            role: ROLE_ADMIN.to_string(),
        };
        assert!(!seller.is_admin());
        assert!(require_admin(&seller).is_err());
        assert!(require_seller(&seller).is_ok());
        assert!(require_user(&seller).is_err());
    }

    #[test]
    fn test_self_or_admin() {
        let id = Uuid::new_v4();
        let user = CurrentAccount {
            id,
            kind: AccountKind::User,
            role: "user".to_string(),
        };
        assert!(require_self_or_admin(&user, id).is_ok());
        assert!(matches!(
            require_self_or_admin(&user, Uuid::new_v4()),
            Err(AppError::Forbidden)
        ));

        let seller = CurrentAccount {
            kind: AccountKind::Seller,
            role: ROLE_SELLER.to_string(),
            ..user
        };
        assert!(require_self_or_admin(&seller, id).is_err());
    }
}
