//! Migration: region tree, shops and the addresses attached to both.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_accounts::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Regions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Regions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Regions::ParentId).uuid().null())
                    .col(ColumnDef::new(Regions::Kind).string().not_null())
                    .col(ColumnDef::new(Regions::NameTm).string().not_null())
                    .col(ColumnDef::new(Regions::NameEn).string().not_null())
                    .col(ColumnDef::new(Regions::NameRu).string().not_null())
                    .col(
                        ColumnDef::new(Regions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Regions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_regions_parent_id")
                            .from(Regions::Table, Regions::ParentId)
                            .to(Regions::Table, Regions::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_regions_parent_id")
                    .table(Regions::Table)
                    .col(Regions::ParentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Shops::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Shops::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Shops::UserId).uuid().not_null())
                    .col(ColumnDef::new(Shops::RegionId).uuid().not_null())
                    .col(ColumnDef::new(Shops::Name).string().not_null())
                    .col(ColumnDef::new(Shops::Slug).string().not_null().unique_key())
                    .col(ColumnDef::new(Shops::Description).text().null())
                    .col(ColumnDef::new(Shops::Phone).string().null())
                    .col(ColumnDef::new(Shops::Image).string().null())
                    .col(ColumnDef::new(Shops::OpensAt).time().null())
                    .col(ColumnDef::new(Shops::ClosesAt).time().null())
                    .col(ColumnDef::new(Shops::Status).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(Shops::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Shops::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shops_user_id")
                            .from(Shops::Table, Shops::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shops_region_id")
                            .from(Shops::Table, Shops::RegionId)
                            .to(Regions::Table, Regions::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .check(Expr::cust(
                        "(opens_at IS NULL) = (closes_at IS NULL) AND (opens_at IS NULL OR opens_at <> closes_at)",
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_shops_user_id")
                    .table(Shops::Table)
                    .col(Shops::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Addresses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Addresses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Addresses::ShopId).uuid().null().unique_key())
                    .col(ColumnDef::new(Addresses::RegionId).uuid().null().unique_key())
                    .col(ColumnDef::new(Addresses::Line).string().not_null())
                    .col(ColumnDef::new(Addresses::PostalCode).string().null())
                    .col(ColumnDef::new(Addresses::Latitude).double().null())
                    .col(ColumnDef::new(Addresses::Longitude).double().null())
                    .col(
                        ColumnDef::new(Addresses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Addresses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_addresses_shop_id")
                            .from(Addresses::Table, Addresses::ShopId)
                            .to(Shops::Table, Shops::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_addresses_region_id")
                            .from(Addresses::Table, Addresses::RegionId)
                            .to(Regions::Table, Regions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    // Exactly one owner
                    .check(Expr::cust("(shop_id IS NULL) <> (region_id IS NULL)"))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Addresses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Shops::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Regions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Regions {
    Table,
    Id,
    ParentId,
    Kind,
    NameTm,
    NameEn,
    NameRu,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum Shops {
    Table,
    Id,
    UserId,
    RegionId,
    Name,
    Slug,
    Description,
    Phone,
    Image,
    OpensAt,
    ClosesAt,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Addresses {
    Table,
    Id,
    ShopId,
    RegionId,
    Line,
    PostalCode,
    Latitude,
    Longitude,
    CreatedAt,
    UpdatedAt,
}
