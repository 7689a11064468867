//! Category repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::base::write_error;
use super::entities::{category, product};
use crate::domain::{Category, CategoryChanges, NewCategory};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Category>>;

    /// Every category, ordered by English name
    async fn all(&self) -> AppResult<Vec<Category>>;

    async fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> AppResult<bool>;

    async fn create(&self, category: NewCategory) -> AppResult<Category>;

    async fn update(&self, id: Uuid, changes: CategoryChanges) -> AppResult<Category>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    async fn count_children(&self, id: Uuid) -> AppResult<u64>;

    async fn count_products(&self, id: Uuid) -> AppResult<u64>;
}

pub struct CategoryStore {
    db: DatabaseConnection,
}

impl CategoryStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryRepository for CategoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Category>> {
        let result = category::Entity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Category::from))
    }

    async fn all(&self) -> AppResult<Vec<Category>> {
        let models = category::Entity::find()
            .order_by_asc(category::Column::NameEn)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Category::from).collect())
    }

    async fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> AppResult<bool> {
        let mut query = category::Entity::find().filter(category::Column::Slug.eq(slug));
        if let Some(id) = except {
            query = query.filter(category::Column::Id.ne(id));
        }
        Ok(query.one(&self.db).await?.is_some())
    }

    async fn create(&self, new: NewCategory) -> AppResult<Category> {
        let now = chrono::Utc::now();
        let model = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            category_id: Set(new.category_id),
            name_tm: Set(new.name_tm),
            name_en: Set(new.name_en),
            name_ru: Set(new.name_ru),
            slug: Set(new.slug),
            image: Set(new.image),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(write_error)?;

        Ok(Category::from(model))
    }

    async fn update(&self, id: Uuid, changes: CategoryChanges) -> AppResult<Category> {
        let existing = category::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: category::ActiveModel = existing.into();
        if let Some(parent) = changes.category_id {
            active.category_id = Set(parent);
        }
        if let Some(name_tm) = changes.name_tm {
            active.name_tm = Set(name_tm);
        }
        if let Some(name_en) = changes.name_en {
            active.name_en = Set(name_en);
        }
        if let Some(name_ru) = changes.name_ru {
            active.name_ru = Set(name_ru);
        }
        if let Some(slug) = changes.slug {
            active.slug = Set(slug);
        }
        if let Some(image) = changes.image {
            active.image = Set(Some(image));
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await.map_err(write_error)?;
        Ok(Category::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = category::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(write_error)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn count_children(&self, id: Uuid) -> AppResult<u64> {
        let count = category::Entity::find()
            .filter(category::Column::CategoryId.eq(id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn count_products(&self, id: Uuid) -> AppResult<u64> {
        let count = product::Entity::find()
            .filter(product::Column::CategoryId.eq(id))
            .count(&self.db)
            .await?;
        Ok(count)
    }
}
