//! Product database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Pricing, Product};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub category_id: Uuid,
    pub shop_id: Uuid,
    pub name_tm: String,
    pub name_en: String,
    pub name_ru: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// Minor currency units
    pub price: i64,
    pub discount_price: Option<i64>,
    pub stock: i32,
    pub status: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "Restrict"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::shop::Entity",
        from = "Column::ShopId",
        to = "super::shop::Column::Id",
        on_delete = "Cascade"
    )]
    Shop,
    #[sea_orm(has_many = "super::product_image::Entity")]
    ProductImage,
    #[sea_orm(has_many = "super::product_composition::Entity")]
    ProductComposition,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::shop::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shop.def()
    }
}

impl Related<super::product_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductImage.def()
    }
}

impl Related<super::product_composition::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductComposition.def()
    }
}

impl Related<super::brand::Entity> for Entity {
    fn to() -> RelationDef {
        super::product_brand::Relation::Brand.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::product_brand::Relation::Product.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Product {
    fn from(model: Model) -> Self {
        Product {
            id: model.id,
            category_id: model.category_id,
            shop_id: model.shop_id,
            name_tm: model.name_tm,
            name_en: model.name_en,
            name_ru: model.name_ru,
            slug: model.slug,
            description: model.description,
            pricing: Pricing {
                price: model.price,
                discount_price: model.discount_price,
            },
            stock: model.stock,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
