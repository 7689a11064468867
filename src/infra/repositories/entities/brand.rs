//! Brand database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::Brand;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "brands")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub image: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product_brand::Entity")]
    ProductBrand,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        super::product_brand::Relation::Product.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::product_brand::Relation::Brand.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Brand {
    fn from(model: Model) -> Self {
        Brand {
            id: model.id,
            name: model.name,
            slug: model.slug,
            image: model.image,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
