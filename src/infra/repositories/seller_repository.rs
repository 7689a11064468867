//! Seller repository. Sellers have no soft delete.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::base::{paginate, search_condition, write_error};
use super::entities::seller::{self, ActiveModel, Entity as SellerEntity};
use crate::config::STATUS_ACTIVE;
use crate::domain::{AccountChanges, AccountFilter, NewAccount, Seller};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SellerRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Seller>>;

    async fn find_by_phone(&self, phone: &str) -> AppResult<Option<Seller>>;

    async fn list(
        &self,
        filter: AccountFilter,
        params: PaginationParams,
    ) -> AppResult<(Vec<Seller>, u64)>;

    async fn create(&self, account: NewAccount) -> AppResult<Seller>;

    async fn update(&self, id: Uuid, changes: AccountChanges) -> AppResult<Seller>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

pub struct SellerStore {
    db: DatabaseConnection,
}

impl SellerStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SellerRepository for SellerStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Seller>> {
        let result = SellerEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Seller::from))
    }

    async fn find_by_phone(&self, phone: &str) -> AppResult<Option<Seller>> {
        let result = SellerEntity::find()
            .filter(seller::Column::Phone.eq(phone))
            .one(&self.db)
            .await?;
        Ok(result.map(Seller::from))
    }

    async fn list(
        &self,
        filter: AccountFilter,
        params: PaginationParams,
    ) -> AppResult<(Vec<Seller>, u64)> {
        let mut query = SellerEntity::find().order_by_desc(seller::Column::CreatedAt);

        if let Some(term) = filter.search.as_deref().filter(|t| !t.trim().is_empty()) {
            query = query.filter(search_condition(
                &[seller::Column::Name, seller::Column::Phone, seller::Column::Email],
                term,
            ));
        }

        let (models, total) = paginate(query, &self.db, &params).await?;
        Ok((models.into_iter().map(Seller::from).collect(), total))
    }

    async fn create(&self, account: NewAccount) -> AppResult<Seller> {
        let now = chrono::Utc::now();
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(account.name),
            phone: Set(account.phone),
            email: Set(account.email),
            image: Set(account.image),
            status: Set(account
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| STATUS_ACTIVE.to_string())),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(write_error)?;

        Ok(Seller::from(model))
    }

    async fn update(&self, id: Uuid, changes: AccountChanges) -> AppResult<Seller> {
        let seller = SellerEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = seller.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(phone);
        }
        if let Some(email) = changes.email {
            active.email = Set(Some(email));
        }
        if let Some(image) = changes.image {
            active.image = Set(Some(image));
        }
        if let Some(status) = changes.status {
            active.status = Set(status.to_string());
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await.map_err(write_error)?;
        Ok(Seller::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = SellerEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
