//! Brand and composition repositories.
//!
//! Both are plain lookup tables, so their stores are assembled from the
//! generic read / write / delete traits in `base`.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Select, Set};
use uuid::Uuid;

use super::base::{DeleteRepository, ReadRepository, WriteRepository};
use super::entities::{brand, composition};
use crate::domain::{
    Brand, BrandChanges, Composition, CompositionChanges, NewBrand, NewComposition,
};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BrandRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Brand>>;

    /// Brands among `ids`; unknown ids are skipped
    async fn find_many(&self, ids: Vec<Uuid>) -> AppResult<Vec<Brand>>;

    async fn list(&self, params: PaginationParams) -> AppResult<(Vec<Brand>, u64)>;

    async fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> AppResult<bool>;

    async fn create(&self, brand: NewBrand) -> AppResult<Brand>;

    async fn update(&self, id: Uuid, changes: BrandChanges) -> AppResult<Brand>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CompositionRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Composition>>;

    /// Compositions among `ids`; unknown ids are skipped
    async fn find_many(&self, ids: Vec<Uuid>) -> AppResult<Vec<Composition>>;

    async fn list(&self, params: PaginationParams) -> AppResult<(Vec<Composition>, u64)>;

    async fn create(&self, composition: NewComposition) -> AppResult<Composition>;

    async fn update(&self, id: Uuid, changes: CompositionChanges) -> AppResult<Composition>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

pub struct BrandStore {
    db: DatabaseConnection,
}

impl BrandStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl ReadRepository<brand::Entity, brand::Model> for BrandStore {
    fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    fn order(&self, select: Select<brand::Entity>) -> Select<brand::Entity> {
        select.order_by_asc(brand::Column::Name)
    }
}

impl WriteRepository<brand::Entity, brand::Model, brand::ActiveModel> for BrandStore {
    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl DeleteRepository<brand::Entity> for BrandStore {
    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl BrandRepository for BrandStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Brand>> {
        let model = ReadRepository::find_by_id(self, id).await?;
        Ok(model.map(Brand::from))
    }

    async fn find_many(&self, ids: Vec<Uuid>) -> AppResult<Vec<Brand>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = brand::Entity::find()
            .filter(brand::Column::Id.is_in(ids))
            .order_by_asc(brand::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Brand::from).collect())
    }

    async fn list(&self, params: PaginationParams) -> AppResult<(Vec<Brand>, u64)> {
        let (models, total) = self.find_paginated(&params).await?;
        Ok((models.into_iter().map(Brand::from).collect(), total))
    }

    async fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> AppResult<bool> {
        let mut query = brand::Entity::find().filter(brand::Column::Slug.eq(slug));
        if let Some(id) = except {
            query = query.filter(brand::Column::Id.ne(id));
        }
        Ok(query.one(&self.db).await?.is_some())
    }

    async fn create(&self, new: NewBrand) -> AppResult<Brand> {
        let now = chrono::Utc::now();
        let model = self
            .insert(brand::ActiveModel {
                id: Set(Uuid::new_v4()),
                name: Set(new.name),
                slug: Set(new.slug),
                image: Set(new.image),
                created_at: Set(now),
                updated_at: Set(now),
            })
            .await?;
        Ok(Brand::from(model))
    }

    async fn update(&self, id: Uuid, changes: BrandChanges) -> AppResult<Brand> {
        let existing = ReadRepository::find_by_id(self, id)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: brand::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(slug) = changes.slug {
            active.slug = Set(slug);
        }
        if let Some(image) = changes.image {
            active.image = Set(Some(image));
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = WriteRepository::update(self, active).await?;
        Ok(Brand::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.delete_by_id(id).await
    }
}

pub struct CompositionStore {
    db: DatabaseConnection,
}

impl CompositionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl ReadRepository<composition::Entity, composition::Model> for CompositionStore {
    fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    fn order(&self, select: Select<composition::Entity>) -> Select<composition::Entity> {
        select.order_by_asc(composition::Column::NameEn)
    }
}

impl WriteRepository<composition::Entity, composition::Model, composition::ActiveModel>
    for CompositionStore
{
    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl DeleteRepository<composition::Entity> for CompositionStore {
    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl CompositionRepository for CompositionStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Composition>> {
        let model = ReadRepository::find_by_id(self, id).await?;
        Ok(model.map(Composition::from))
    }

    async fn find_many(&self, ids: Vec<Uuid>) -> AppResult<Vec<Composition>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = composition::Entity::find()
            .filter(composition::Column::Id.is_in(ids))
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Composition::from).collect())
    }

    async fn list(&self, params: PaginationParams) -> AppResult<(Vec<Composition>, u64)> {
        let (models, total) = self.find_paginated(&params).await?;
        Ok((models.into_iter().map(Composition::from).collect(), total))
    }

    async fn create(&self, new: NewComposition) -> AppResult<Composition> {
        let now = chrono::Utc::now();
        let model = self
            .insert(composition::ActiveModel {
                id: Set(Uuid::new_v4()),
                name_tm: Set(new.name_tm),
                name_en: Set(new.name_en),
                name_ru: Set(new.name_ru),
                created_at: Set(now),
                updated_at: Set(now),
            })
            .await?;
        Ok(Composition::from(model))
    }

    async fn update(&self, id: Uuid, changes: CompositionChanges) -> AppResult<Composition> {
        let existing = ReadRepository::find_by_id(self, id)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: composition::ActiveModel = existing.into();
        if let Some(name_tm) = changes.name_tm {
            active.name_tm = Set(name_tm);
        }
        if let Some(name_en) = changes.name_en {
            active.name_en = Set(name_en);
        }
        if let Some(name_ru) = changes.name_ru {
            active.name_ru = Set(name_ru);
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = WriteRepository::update(self, active).await?;
        Ok(Composition::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.delete_by_id(id).await
    }
}
