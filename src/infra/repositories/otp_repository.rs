//! One-time code storage for both account kinds.
//!
//! Users and sellers keep their codes in separate tables with the same
//! layout; every method dispatches on [`AccountKind`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use super::entities::{seller_otp, user_otp};
use crate::config::OTP_MAX_ATTEMPTS;
use crate::domain::{AccountKind, OneTimePassword, OtpCode};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OtpRepository: Send + Sync {
    /// Store a new code, discarding every unconsumed code of the owner.
    async fn replace(
        &self,
        kind: AccountKind,
        owner_id: Uuid,
        code: OtpCode,
        expires_at: DateTime<Utc>,
    ) -> AppResult<OneTimePassword>;

    /// Most recent unconsumed, unexpired code of the owner
    async fn find_live(
        &self,
        kind: AccountKind,
        owner_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<OneTimePassword>>;

    /// Mark a code consumed. Returns false when it was already used.
    async fn consume(&self, kind: AccountKind, id: Uuid, now: DateTime<Utc>) -> AppResult<bool>;

    /// Count one wrong guess against a code
    async fn record_failure(&self, kind: AccountKind, id: Uuid) -> AppResult<()>;
}

pub struct OtpStore {
    db: DatabaseConnection,
}

impl OtpStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OtpRepository for OtpStore {
    async fn replace(
        &self,
        kind: AccountKind,
        owner_id: Uuid,
        code: OtpCode,
        expires_at: DateTime<Utc>,
    ) -> AppResult<OneTimePassword> {
        let txn = self.db.begin().await?;
        let now = Utc::now();
        let id = Uuid::new_v4();

        let otp = match kind {
            AccountKind::User => {
                user_otp::Entity::delete_many()
                    .filter(user_otp::Column::UserId.eq(owner_id))
                    .filter(user_otp::Column::ConsumedAt.is_null())
                    .exec(&txn)
                    .await?;

                user_otp::ActiveModel {
                    id: Set(id),
                    user_id: Set(owner_id),
                    code_hash: Set(code.into_string()),
                    expires_at: Set(expires_at),
                    consumed_at: Set(None),
                    attempts: Set(0),
                    created_at: Set(now),
                }
                .insert(&txn)
                .await
                .map(OneTimePassword::from)?
            }
            AccountKind::Seller => {
                seller_otp::Entity::delete_many()
                    .filter(seller_otp::Column::SellerId.eq(owner_id))
                    .filter(seller_otp::Column::ConsumedAt.is_null())
                    .exec(&txn)
                    .await?;

                seller_otp::ActiveModel {
                    id: Set(id),
                    seller_id: Set(owner_id),
                    code_hash: Set(code.into_string()),
                    expires_at: Set(expires_at),
                    consumed_at: Set(None),
                    attempts: Set(0),
                    created_at: Set(now),
                }
                .insert(&txn)
                .await
                .map(OneTimePassword::from)?
            }
        };

        txn.commit().await?;
        Ok(otp)
    }

    async fn find_live(
        &self,
        kind: AccountKind,
        owner_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<OneTimePassword>> {
        let otp = match kind {
            AccountKind::User => user_otp::Entity::find()
                .filter(user_otp::Column::UserId.eq(owner_id))
                .filter(user_otp::Column::ConsumedAt.is_null())
                .filter(user_otp::Column::ExpiresAt.gt(now))
                .filter(user_otp::Column::Attempts.lt(OTP_MAX_ATTEMPTS))
                .order_by_desc(user_otp::Column::CreatedAt)
                .one(&self.db)
                .await?
                .map(OneTimePassword::from),
            AccountKind::Seller => seller_otp::Entity::find()
                .filter(seller_otp::Column::SellerId.eq(owner_id))
                .filter(seller_otp::Column::ConsumedAt.is_null())
                .filter(seller_otp::Column::ExpiresAt.gt(now))
                .filter(seller_otp::Column::Attempts.lt(OTP_MAX_ATTEMPTS))
                .order_by_desc(seller_otp::Column::CreatedAt)
                .one(&self.db)
                .await?
                .map(OneTimePassword::from),
        };

        Ok(otp)
    }

    async fn consume(&self, kind: AccountKind, id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        // Conditional update so two concurrent logins cannot both win
        let result = match kind {
            AccountKind::User => {
                user_otp::Entity::update_many()
                    .col_expr(user_otp::Column::ConsumedAt, Expr::value(now))
                    .filter(user_otp::Column::Id.eq(id))
                    .filter(user_otp::Column::ConsumedAt.is_null())
                    .exec(&self.db)
                    .await?
            }
            AccountKind::Seller => {
                seller_otp::Entity::update_many()
                    .col_expr(seller_otp::Column::ConsumedAt, Expr::value(now))
                    .filter(seller_otp::Column::Id.eq(id))
                    .filter(seller_otp::Column::ConsumedAt.is_null())
                    .exec(&self.db)
                    .await?
            }
        };

        Ok(result.rows_affected == 1)
    }

    async fn record_failure(&self, kind: AccountKind, id: Uuid) -> AppResult<()> {
        match kind {
            AccountKind::User => {
                user_otp::Entity::update_many()
                    .col_expr(
                        user_otp::Column::Attempts,
                        Expr::col(user_otp::Column::Attempts).add(1),
                    )
                    .filter(user_otp::Column::Id.eq(id))
                    .exec(&self.db)
                    .await?;
            }
            AccountKind::Seller => {
                seller_otp::Entity::update_many()
                    .col_expr(
                        seller_otp::Column::Attempts,
                        Expr::col(seller_otp::Column::Attempts).add(1),
                    )
                    .filter(seller_otp::Column::Id.eq(id))
                    .exec(&self.db)
                    .await?;
            }
        }
        Ok(())
    }
}
