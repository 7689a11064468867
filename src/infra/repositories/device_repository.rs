use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use super::entities::device;
use crate::domain::{Device, DeviceOwner, Platform};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait DeviceRepository: Send + Sync {
    /// Register a token. A token already on file moves to the new owner.
    async fn upsert(&self, owner: DeviceOwner, token: String, platform: Platform)
        -> AppResult<Device>;

    async fn list_for(&self, owner: DeviceOwner) -> AppResult<Vec<Device>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Device>>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

pub struct DeviceStore {
    db: DatabaseConnection,
}

impl DeviceStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DeviceRepository for DeviceStore {
    async fn upsert(
        &self,
        owner: DeviceOwner,
        token: String,
        platform: Platform,
    ) -> AppResult<Device> {
        let now = chrono::Utc::now();
        let model = device::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(owner.user_id()),
            seller_id: Set(owner.seller_id()),
            token: Set(token),
            platform: Set(platform.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let saved = device::Entity::insert(model)
            .on_conflict(
                OnConflict::column(device::Column::Token)
                    .update_columns([
                        device::Column::UserId,
                        device::Column::SellerId,
                        device::Column::Platform,
                        device::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await?;

        Device::try_from(saved)
    }

    async fn list_for(&self, owner: DeviceOwner) -> AppResult<Vec<Device>> {
        let column = match owner.user_id() {
            Some(_) => device::Column::UserId,
            None => device::Column::SellerId,
        };
        let models = device::Entity::find()
            .filter(column.eq(owner.id))
            .order_by_desc(device::Column::UpdatedAt)
            .all(&self.db)
            .await?;

        models.into_iter().map(Device::try_from).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Device>> {
        device::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Device::try_from)
            .transpose()
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = device::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
