//! Address database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Address, AddressOwner};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "addresses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub shop_id: Option<Uuid>,
    #[sea_orm(unique)]
    pub region_id: Option<Uuid>,
    pub line: String,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shop::Entity",
        from = "Column::ShopId",
        to = "super::shop::Column::Id",
        on_delete = "Cascade"
    )]
    Shop,
    #[sea_orm(
        belongs_to = "super::region::Entity",
        from = "Column::RegionId",
        to = "super::region::Column::Id",
        on_delete = "Cascade"
    )]
    Region,
}

impl Related<super::shop::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shop.def()
    }
}

impl Related<super::region::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Region.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Address {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let owner = AddressOwner::from_columns(model.shop_id, model.region_id)
            .ok_or_else(|| AppError::internal(format!("Address {} has no single owner", model.id)))?;

        Ok(Address {
            id: model.id,
            owner,
            line: model.line,
            postal_code: model.postal_code,
            latitude: model.latitude,
            longitude: model.longitude,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
