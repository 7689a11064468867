//! Shop database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{BusinessHours, Shop};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "shops")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub region_id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub phone: Option<String>,
    pub image: Option<String>,
    pub opens_at: Option<Time>,
    pub closes_at: Option<Time>,
    pub status: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::region::Entity",
        from = "Column::RegionId",
        to = "super::region::Column::Id",
        on_delete = "Restrict"
    )]
    Region,
    #[sea_orm(has_one = "super::address::Entity")]
    Address,
    #[sea_orm(has_many = "super::product::Entity")]
    Product,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::region::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Region.def()
    }
}

impl Related<super::address::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Address.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Shop {
    fn from(model: Model) -> Self {
        Shop {
            id: model.id,
            user_id: model.user_id,
            region_id: model.region_id,
            name: model.name,
            slug: model.slug,
            description: model.description,
            phone: model.phone,
            image: model.image,
            // The table check constraint keeps the pair consistent
            hours: BusinessHours::from_pair(model.opens_at, model.closes_at)
                .ok()
                .flatten(),
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
