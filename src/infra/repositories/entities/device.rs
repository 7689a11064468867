//! Device database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Device, DeviceOwner};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "devices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub seller_id: Option<Uuid>,
    #[sea_orm(unique)]
    pub token: String,
    pub platform: String,
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
        belongs_to = "super::seller::Entity",
        from = "Column::SellerId",
        to = "super::seller::Column::Id",
        on_delete = "Cascade"
    )]
    Seller,
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Device {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let owner = DeviceOwner::from_columns(model.user_id, model.seller_id)
            .ok_or_else(|| AppError::internal(format!("Device {} has no single owner", model.id)))?;

        Ok(Device {
            id: model.id,
            owner,
            token: model.token,
            platform: model.platform.parse().map_err(AppError::internal)?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
