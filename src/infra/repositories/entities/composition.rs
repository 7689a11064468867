//! Composition database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::Composition;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "compositions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name_tm: String,
    pub name_en: String,
    pub name_ru: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product_composition::Entity")]
    ProductComposition,
}

impl Related<super::product_composition::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductComposition.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Composition {
    fn from(model: Model) -> Self {
        Composition {
            id: model.id,
            name_tm: model.name_tm,
            name_en: model.name_en,
            name_ru: model.name_ru,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
