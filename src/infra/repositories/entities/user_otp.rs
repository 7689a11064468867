//! One-time codes issued to users.

use sea_orm::entity::prelude::*;

use crate::domain::{OneTimePassword, OtpCode};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_otps")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub code_hash: String,
    pub expires_at: DateTimeUtc,
    pub consumed_at: Option<DateTimeUtc>,
    pub attempts: i32,
    pub created_at: DateTimeUtc,
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
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for OneTimePassword {
    fn from(model: Model) -> Self {
        OneTimePassword {
            id: model.id,
            owner_id: model.user_id,
            code: OtpCode::from_hash(model.code_hash),
            expires_at: model.expires_at,
            consumed_at: model.consumed_at,
            attempts: model.attempts,
            created_at: model.created_at,
        }
    }
}
