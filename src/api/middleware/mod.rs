//! API middleware.

mod auth;
mod rate_limit;

pub use auth::{
    auth_middleware, require_admin, require_self_or_admin, require_seller, require_user,
    CurrentAccount,
};
pub use rate_limit::{rate_limit_middleware, rate_limit_otp_middleware};
