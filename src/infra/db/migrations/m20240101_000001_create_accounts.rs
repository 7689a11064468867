//! Migration: users, sellers and their one-time codes.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Phone).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Email).string().null().unique_key())
                    .col(ColumnDef::new(Users::Image).string().null())
                    .col(
                        ColumnDef::new(Users::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Users::Role).string().not_null().default("user"))
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Users::DeletedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        // Index for filtering out soft deleted users
        manager
            .create_index(
                Index::create()
                    .name("idx_users_deleted_at")
                    .table(Users::Table)
                    .col(Users::DeletedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Sellers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Sellers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Sellers::Name).string().not_null())
                    .col(ColumnDef::new(Sellers::Phone).string().not_null().unique_key())
                    .col(ColumnDef::new(Sellers::Email).string().null())
                    .col(ColumnDef::new(Sellers::Image).string().null())
                    .col(
                        ColumnDef::new(Sellers::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Sellers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Sellers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(otp_table(UserOtps::Table, UserOtps::UserId, Users::Table))
            .await?;
        manager
            .create_table(otp_table(SellerOtps::Table, SellerOtps::SellerId, Sellers::Table))
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SellerOtps::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserOtps::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sellers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

/// Both OTP tables share one layout and differ only in the owner column.
fn otp_table<T, O, P>(table: T, owner: O, parent: P) -> TableCreateStatement
where
    T: IntoIden + Copy + 'static,
    O: IntoIden + Copy + 'static,
    P: IntoIden + 'static,
{
    Table::create()
        .table(table)
        .if_not_exists()
        .col(ColumnDef::new(Otp::Id).uuid().not_null().primary_key())
        .col(ColumnDef::new(owner).uuid().not_null())
        .col(ColumnDef::new(Otp::CodeHash).string().not_null())
        .col(ColumnDef::new(Otp::ExpiresAt).timestamp_with_time_zone().not_null())
        .col(ColumnDef::new(Otp::ConsumedAt).timestamp_with_time_zone().null())
        .col(ColumnDef::new(Otp::Attempts).integer().not_null().default(0))
        .col(
            ColumnDef::new(Otp::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .foreign_key(
            ForeignKey::create()
                .from(table, owner)
                .to(parent, Otp::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

#[derive(Iden)]
pub enum Users {
    Table,
    Id,
    Name,
    Phone,
    Email,
    Image,
    Status,
    Role,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(Iden)]
pub enum Sellers {
    Table,
    Id,
    Name,
    Phone,
    Email,
    Image,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden, Clone, Copy)]
enum UserOtps {
    Table,
    UserId,
}

#[derive(Iden, Clone, Copy)]
enum SellerOtps {
    Table,
    SellerId,
}

#[derive(Iden)]
enum Otp {
    Id,
    CodeHash,
    ExpiresAt,
    ConsumedAt,
    Attempts,
    CreatedAt,
}
