//! Seller database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{AccountStatus, Seller};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sellers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub phone: String,
    pub email: Option<String>,
    pub image: Option<String>,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::seller_otp::Entity")]
    SellerOtp,
}

impl Related<super::seller_otp::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SellerOtp.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Seller {
    fn from(model: Model) -> Self {
        Seller {
            id: model.id,
            name: model.name,
            phone: model.phone,
            email: model.email,
            image: model.image,
            status: AccountStatus::from(model.status.as_str()),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
