//! Region repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::base::write_error;
use super::entities::{region, shop};
use crate::domain::{Region, RegionFilter, RegionInput};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RegionRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Region>>;

    /// Regions matching the filter, ordered by English name
    async fn list(&self, filter: RegionFilter) -> AppResult<Vec<Region>>;

    async fn create(&self, input: RegionInput) -> AppResult<Region>;

    async fn update(&self, id: Uuid, input: RegionInput) -> AppResult<Region>;

    /// Delete a region; its address goes with it through the foreign key.
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    async fn count_children(&self, id: Uuid) -> AppResult<u64>;

    async fn count_shops(&self, id: Uuid) -> AppResult<u64>;
}

pub struct RegionStore {
    db: DatabaseConnection,
}

impl RegionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RegionRepository for RegionStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Region>> {
        region::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Region::try_from)
            .transpose()
    }

    async fn list(&self, filter: RegionFilter) -> AppResult<Vec<Region>> {
        let mut query = region::Entity::find().order_by_asc(region::Column::NameEn);

        if let Some(parent_id) = filter.parent_id {
            query = query.filter(region::Column::ParentId.eq(parent_id));
        }
        if let Some(kind) = filter.kind {
            query = query.filter(region::Column::Kind.eq(kind.as_str()));
        }

        query
            .all(&self.db)
            .await?
            .into_iter()
            .map(Region::try_from)
            .collect()
    }

    async fn create(&self, input: RegionInput) -> AppResult<Region> {
        let now = chrono::Utc::now();
        let model = region::ActiveModel {
            id: Set(Uuid::new_v4()),
            parent_id: Set(input.parent_id),
            kind: Set(input.kind.as_str().to_string()),
            name_tm: Set(input.name_tm),
            name_en: Set(input.name_en),
            name_ru: Set(input.name_ru),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(write_error)?;

        Region::try_from(model)
    }

    async fn update(&self, id: Uuid, input: RegionInput) -> AppResult<Region> {
        let existing = region::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: region::ActiveModel = existing.into();
        active.parent_id = Set(input.parent_id);
        active.kind = Set(input.kind.as_str().to_string());
        active.name_tm = Set(input.name_tm);
        active.name_en = Set(input.name_en);
        active.name_ru = Set(input.name_ru);
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await.map_err(write_error)?;
        Region::try_from(model)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = region::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(write_error)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn count_children(&self, id: Uuid) -> AppResult<u64> {
        let count = region::Entity::find()
            .filter(region::Column::ParentId.eq(id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn count_shops(&self, id: Uuid) -> AppResult<u64> {
        let count = shop::Entity::find()
            .filter(shop::Column::RegionId.eq(id))
            .count(&self.db)
            .await?;
        Ok(count)
    }
}
