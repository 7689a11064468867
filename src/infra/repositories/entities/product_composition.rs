//! Pivot between products and compositions, carrying the quantity.

use sea_orm::entity::prelude::*;

use crate::domain::CompositionLink;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "product_compositions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub product_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub composition_id: Uuid,
    pub qty: f64,
    pub qty_type: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::composition::Entity",
        from = "Column::CompositionId",
        to = "super::composition::Column::Id",
        on_delete = "Cascade"
    )]
    Composition,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::composition::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Composition.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for CompositionLink {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(CompositionLink {
            composition_id: model.composition_id,
            qty: model.qty,
            qty_type: model.qty_type.parse().map_err(AppError::internal)?,
        })
    }
}
