//! Product repository.
//!
//! Reads go through [`ProductRepository`]. Multi-table writes live in the
//! generic functions at the bottom, driven by the unit of work inside a
//! transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::base::{paginate, search_condition, write_error};
use super::entities::{brand, composition, product, product_brand, product_composition, product_image};
use crate::domain::{
    Brand, Composition, CompositionLink, NewProduct, Product, ProductChanges, ProductFilter,
    ProductImage,
};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>>;

    async fn list(
        &self,
        filter: ProductFilter,
        params: PaginationParams,
    ) -> AppResult<(Vec<Product>, u64)>;

    async fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> AppResult<bool>;

    async fn brands_of(&self, product_id: Uuid) -> AppResult<Vec<Brand>>;

    /// Compositions with their pivot quantities
    async fn compositions_of(&self, product_id: Uuid)
        -> AppResult<Vec<(Composition, CompositionLink)>>;

    /// Images ordered by position
    async fn images_of(&self, product_id: Uuid) -> AppResult<Vec<ProductImage>>;

    async fn find_image(&self, product_id: Uuid, image_id: Uuid)
        -> AppResult<Option<ProductImage>>;

    /// Append an image after the current last position
    async fn add_image(&self, product_id: Uuid, path: String) -> AppResult<ProductImage>;

    async fn remove_image(&self, image_id: Uuid) -> AppResult<()>;
}

pub struct ProductStore {
    db: DatabaseConnection,
}

impl ProductStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for ProductStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>> {
        let result = product::Entity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Product::from))
    }

    async fn list(
        &self,
        filter: ProductFilter,
        params: PaginationParams,
    ) -> AppResult<(Vec<Product>, u64)> {
        let mut query = product::Entity::find().order_by_desc(product::Column::CreatedAt);

        if let Some(category_id) = filter.category_id {
            query = query.filter(product::Column::CategoryId.eq(category_id));
        }
        if let Some(shop_id) = filter.shop_id {
            query = query.filter(product::Column::ShopId.eq(shop_id));
        }
        if let Some(brand_id) = filter.brand_id {
            query = query
                .inner_join(brand::Entity)
                .filter(brand::Column::Id.eq(brand_id));
        }
        if let Some(term) = filter.search.as_deref().filter(|t| !t.trim().is_empty()) {
            query = query.filter(search_condition(
                &[
                    product::Column::NameTm,
                    product::Column::NameEn,
                    product::Column::NameRu,
                ],
                term,
            ));
        }
        // Price bounds compare against what the buyer pays
        if let Some(min) = filter.min_price {
            query = query.filter(Expr::cust_with_values(
                "COALESCE(products.discount_price, products.price) >= $1",
                [min],
            ));
        }
        if let Some(max) = filter.max_price {
            query = query.filter(Expr::cust_with_values(
                "COALESCE(products.discount_price, products.price) <= $1",
                [max],
            ));
        }

        let (models, total) = paginate(query, &self.db, &params).await?;
        Ok((models.into_iter().map(Product::from).collect(), total))
    }

    async fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> AppResult<bool> {
        let mut query = product::Entity::find().filter(product::Column::Slug.eq(slug));
        if let Some(id) = except {
            query = query.filter(product::Column::Id.ne(id));
        }
        Ok(query.one(&self.db).await?.is_some())
    }

    async fn brands_of(&self, product_id: Uuid) -> AppResult<Vec<Brand>> {
        let models = brand::Entity::find()
            .inner_join(product::Entity)
            .filter(product::Column::Id.eq(product_id))
            .order_by_asc(brand::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Brand::from).collect())
    }

    async fn compositions_of(
        &self,
        product_id: Uuid,
    ) -> AppResult<Vec<(Composition, CompositionLink)>> {
        let rows = product_composition::Entity::find()
            .filter(product_composition::Column::ProductId.eq(product_id))
            .find_also_related(composition::Entity)
            .all(&self.db)
            .await?;

        rows.into_iter()
            .filter_map(|(link, composition)| composition.map(|c| (c, link)))
            .map(|(composition, link)| {
                Ok((Composition::from(composition), CompositionLink::try_from(link)?))
            })
            .collect()
    }

    async fn images_of(&self, product_id: Uuid) -> AppResult<Vec<ProductImage>> {
        let models = product_image::Entity::find()
            .filter(product_image::Column::ProductId.eq(product_id))
            .order_by_asc(product_image::Column::Position)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(ProductImage::from).collect())
    }

    async fn find_image(
        &self,
        product_id: Uuid,
        image_id: Uuid,
    ) -> AppResult<Option<ProductImage>> {
        let result = product_image::Entity::find_by_id(image_id)
            .filter(product_image::Column::ProductId.eq(product_id))
            .one(&self.db)
            .await?;
        Ok(result.map(ProductImage::from))
    }

    async fn add_image(&self, product_id: Uuid, path: String) -> AppResult<ProductImage> {
        let position = next_image_position(&self.db, product_id).await?;
        insert_image(&self.db, product_id, path, position).await
    }

    async fn remove_image(&self, image_id: Uuid) -> AppResult<()> {
        let result = product_image::Entity::delete_by_id(image_id)
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

pub(crate) async fn insert<C: ConnectionTrait>(conn: &C, new: NewProduct) -> AppResult<Product> {
    let now = chrono::Utc::now();
    let model = product::ActiveModel {
        id: Set(Uuid::new_v4()),
        category_id: Set(new.category_id),
        shop_id: Set(new.shop_id),
        name_tm: Set(new.name_tm),
        name_en: Set(new.name_en),
        name_ru: Set(new.name_ru),
        slug: Set(new.slug),
        description: Set(new.description),
        price: Set(new.pricing.price),
        discount_price: Set(new.pricing.discount_price),
        stock: Set(new.stock),
        status: Set(new.status),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
    .map_err(write_error)?;

    Ok(Product::from(model))
}

pub(crate) async fn update<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    changes: ProductChanges,
) -> AppResult<Product> {
    let existing = product::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: product::ActiveModel = existing.into();
    if let Some(category_id) = changes.category_id {
        active.category_id = Set(category_id);
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
    if let Some(description) = changes.description {
        active.description = Set(Some(description));
    }
    if let Some(pricing) = changes.pricing {
        active.price = Set(pricing.price);
        active.discount_price = Set(pricing.discount_price);
    }
    if let Some(stock) = changes.stock {
        active.stock = Set(stock);
    }
    if let Some(status) = changes.status {
        active.status = Set(status);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(conn).await.map_err(write_error)?;
    Ok(Product::from(model))
}

/// Delete a product and return the paths of its images.
pub(crate) async fn delete<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<Vec<String>> {
    let paths = product_image::Entity::find()
        .filter(product_image::Column::ProductId.eq(id))
        .select_only()
        .column(product_image::Column::Path)
        .into_tuple::<String>()
        .all(conn)
        .await?;

    let result = product::Entity::delete_by_id(id).exec(conn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(paths)
}

/// Replace the brand links of a product.
pub(crate) async fn set_brands<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    brand_ids: Vec<Uuid>,
) -> AppResult<()> {
    product_brand::Entity::delete_many()
        .filter(product_brand::Column::ProductId.eq(product_id))
        .exec(conn)
        .await?;

    let mut ids = brand_ids;
    ids.sort();
    ids.dedup();
    if ids.is_empty() {
        return Ok(());
    }

    let rows = ids.into_iter().map(|brand_id| product_brand::ActiveModel {
        product_id: Set(product_id),
        brand_id: Set(brand_id),
    });
    product_brand::Entity::insert_many(rows)
        .exec(conn)
        .await
        .map_err(write_error)?;
    Ok(())
}

/// Replace the composition pivots of a product. A repeated composition
/// keeps its last quantity.
pub(crate) async fn set_compositions<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    links: Vec<CompositionLink>,
) -> AppResult<()> {
    product_composition::Entity::delete_many()
        .filter(product_composition::Column::ProductId.eq(product_id))
        .exec(conn)
        .await?;

    let unique: HashMap<Uuid, CompositionLink> = links
        .into_iter()
        .map(|link| (link.composition_id, link))
        .collect();
    if unique.is_empty() {
        return Ok(());
    }

    let rows = unique
        .into_values()
        .map(|link| product_composition::ActiveModel {
            product_id: Set(product_id),
            composition_id: Set(link.composition_id),
            qty: Set(link.qty),
            qty_type: Set(link.qty_type.as_str().to_string()),
        });
    product_composition::Entity::insert_many(rows)
        .exec(conn)
        .await
        .map_err(write_error)?;
    Ok(())
}

pub(crate) async fn next_image_position<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
) -> AppResult<i32> {
    let last: Option<Option<i32>> = product_image::Entity::find()
        .filter(product_image::Column::ProductId.eq(product_id))
        .select_only()
        .column_as(product_image::Column::Position.max(), "max_position")
        .into_tuple::<Option<i32>>()
        .one(conn)
        .await?;

    Ok(last.flatten().map_or(0, |p| p + 1))
}

pub(crate) async fn insert_image<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    path: String,
    position: i32,
) -> AppResult<ProductImage> {
    let model = product_image::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        path: Set(path),
        position: Set(position),
        created_at: Set(chrono::Utc::now()),
    }
    .insert(conn)
    .await
    .map_err(write_error)?;

    Ok(ProductImage::from(model))
}
