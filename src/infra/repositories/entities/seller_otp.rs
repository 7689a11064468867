//! One-time codes issued to sellers.

use sea_orm::entity::prelude::*;

use crate::domain::{OneTimePassword, OtpCode};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "seller_otps")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub seller_id: Uuid,
    pub code_hash: String,
    pub expires_at: DateTimeUtc,
    pub consumed_at: Option<DateTimeUtc>,
    pub attempts: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::seller::Entity",
        from = "Column::SellerId",
        to = "super::seller::Column::Id",
        on_delete = "Cascade"
    )]
    Seller,
}

impl Related<super::seller::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Seller.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for OneTimePassword {
    fn from(model: Model) -> Self {
        OneTimePassword {
            id: model.id,
            owner_id: model.seller_id,
            code: OtpCode::from_hash(model.code_hash),
            expires_at: model.expires_at,
            consumed_at: model.consumed_at,
            attempts: model.attempts,
            created_at: model.created_at,
        }
    }
}
