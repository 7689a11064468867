//! Region database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::Region;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "regions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub kind: String,
    pub name_tm: String,
    pub name_en: String,
    pub name_ru: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id",
        on_delete = "Restrict"
    )]
    Parent,
    #[sea_orm(has_one = "super::address::Entity")]
    Address,
    #[sea_orm(has_many = "super::shop::Entity")]
    Shop,
}

impl Related<super::address::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Address.def()
    }
}

impl Related<super::shop::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shop.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Rows with an unknown kind were not written by this service.
impl TryFrom<Model> for Region {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Region {
            id: model.id,
            parent_id: model.parent_id,
            kind: model.kind.parse().map_err(AppError::internal)?,
            name_tm: model.name_tm,
            name_en: model.name_en,
            name_ru: model.name_ru,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
