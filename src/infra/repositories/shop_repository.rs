//! Shop repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::base::{paginate, search_condition, write_error};
use super::entities::{product, product_image, shop};
use crate::domain::{NewShop, Shop, ShopChanges, ShopFilter};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ShopRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Shop>>;

    async fn list(&self, filter: ShopFilter, params: PaginationParams)
        -> AppResult<(Vec<Shop>, u64)>;

    /// Whether another shop already uses `slug`
    async fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> AppResult<bool>;

    async fn update(&self, id: Uuid, changes: ShopChanges) -> AppResult<Shop>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Stored paths of every product image in the shop
    async fn product_image_paths(&self, id: Uuid) -> AppResult<Vec<String>>;

    /// Stored paths of the shop pictures and product images of every shop
    /// owned by `user_id`
    async fn owner_image_paths(&self, user_id: Uuid) -> AppResult<Vec<String>>;
}

pub struct ShopStore {
    db: DatabaseConnection,
}

impl ShopStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ShopRepository for ShopStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Shop>> {
        let result = shop::Entity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Shop::from))
    }

    async fn list(
        &self,
        filter: ShopFilter,
        params: PaginationParams,
    ) -> AppResult<(Vec<Shop>, u64)> {
        let mut query = shop::Entity::find().order_by_desc(shop::Column::CreatedAt);

        if let Some(user_id) = filter.user_id {
            query = query.filter(shop::Column::UserId.eq(user_id));
        }
        if let Some(region_id) = filter.region_id {
            query = query.filter(shop::Column::RegionId.eq(region_id));
        }
        if let Some(term) = filter.search.as_deref().filter(|t| !t.trim().is_empty()) {
            query = query.filter(search_condition(&[shop::Column::Name], term));
        }

        let (models, total) = paginate(query, &self.db, &params).await?;
        Ok((models.into_iter().map(Shop::from).collect(), total))
    }

    async fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> AppResult<bool> {
        let mut query = shop::Entity::find().filter(shop::Column::Slug.eq(slug));
        if let Some(id) = except {
            query = query.filter(shop::Column::Id.ne(id));
        }
        Ok(query.one(&self.db).await?.is_some())
    }

    async fn update(&self, id: Uuid, changes: ShopChanges) -> AppResult<Shop> {
        let existing = shop::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: shop::ActiveModel = existing.into();
        if let Some(region_id) = changes.region_id {
            active.region_id = Set(region_id);
        }
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(slug) = changes.slug {
            active.slug = Set(slug);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(image) = changes.image {
            active.image = Set(Some(image));
        }
        if let Some(hours) = changes.hours {
            active.opens_at = Set(hours.map(|h| h.opens_at));
            active.closes_at = Set(hours.map(|h| h.closes_at));
        }
        if let Some(status) = changes.status {
            active.status = Set(status);
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await.map_err(write_error)?;
        Ok(Shop::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = shop::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(write_error)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn product_image_paths(&self, id: Uuid) -> AppResult<Vec<String>> {
        let paths = product_image::Entity::find()
            .inner_join(product::Entity)
            .filter(product::Column::ShopId.eq(id))
            .select_only()
            .column(product_image::Column::Path)
            .into_tuple::<String>()
            .all(&self.db)
            .await?;
        Ok(paths)
    }

    async fn owner_image_paths(&self, user_id: Uuid) -> AppResult<Vec<String>> {
        let shops: Vec<(Uuid, Option<String>)> = shop::Entity::find()
            .filter(shop::Column::UserId.eq(user_id))
            .select_only()
            .column(shop::Column::Id)
            .column(shop::Column::Image)
            .into_tuple()
            .all(&self.db)
            .await?;
        if shops.is_empty() {
            return Ok(Vec::new());
        }

        let shop_ids: Vec<Uuid> = shops.iter().map(|(id, _)| *id).collect();
        let mut paths = product_image::Entity::find()
            .inner_join(product::Entity)
            .filter(product::Column::ShopId.is_in(shop_ids))
            .select_only()
            .column(product_image::Column::Path)
            .into_tuple::<String>()
            .all(&self.db)
            .await?;

        paths.extend(shops.into_iter().filter_map(|(_, image)| image));
        Ok(paths)
    }
}

/// Insert a shop row. Used inside the create transaction.
pub(crate) async fn insert<C: ConnectionTrait>(conn: &C, shop: NewShop) -> AppResult<Shop> {
    let now = chrono::Utc::now();
    let model = shop::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(shop.user_id),
        region_id: Set(shop.region_id),
        name: Set(shop.name),
        slug: Set(shop.slug),
        description: Set(shop.description),
        phone: Set(shop.phone),
        image: Set(shop.image),
        opens_at: Set(shop.hours.map(|h| h.opens_at)),
        closes_at: Set(shop.hours.map(|h| h.closes_at)),
        status: Set(shop.status),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
    .map_err(write_error)?;

    Ok(Shop::from(model))
}
