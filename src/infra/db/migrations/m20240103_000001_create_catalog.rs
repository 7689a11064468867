//! Migration: categories, brands, compositions, products and their pivots.

use sea_orm_migration::prelude::*;

use super::m20240102_000001_create_regions::Shops;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Categories::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Categories::CategoryId).uuid().null())
                    .col(ColumnDef::new(Categories::NameTm).string().not_null())
                    .col(ColumnDef::new(Categories::NameEn).string().not_null())
                    .col(ColumnDef::new(Categories::NameRu).string().not_null())
                    .col(ColumnDef::new(Categories::Slug).string().not_null().unique_key())
                    .col(ColumnDef::new(Categories::Image).string().null())
                    .col(timestamp(Categories::CreatedAt))
                    .col(timestamp(Categories::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_categories_category_id")
                            .from(Categories::Table, Categories::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Brands::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Brands::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Brands::Name).string().not_null())
                    .col(ColumnDef::new(Brands::Slug).string().not_null().unique_key())
                    .col(ColumnDef::new(Brands::Image).string().null())
                    .col(timestamp(Brands::CreatedAt))
                    .col(timestamp(Brands::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Compositions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Compositions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Compositions::NameTm).string().not_null())
                    .col(ColumnDef::new(Compositions::NameEn).string().not_null())
                    .col(ColumnDef::new(Compositions::NameRu).string().not_null())
                    .col(timestamp(Compositions::CreatedAt))
                    .col(timestamp(Compositions::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Products::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Products::CategoryId).uuid().not_null())
                    .col(ColumnDef::new(Products::ShopId).uuid().not_null())
                    .col(ColumnDef::new(Products::NameTm).string().not_null())
                    .col(ColumnDef::new(Products::NameEn).string().not_null())
                    .col(ColumnDef::new(Products::NameRu).string().not_null())
                    .col(ColumnDef::new(Products::Slug).string().not_null().unique_key())
                    .col(ColumnDef::new(Products::Description).text().null())
                    .col(ColumnDef::new(Products::Price).big_integer().not_null())
                    .col(ColumnDef::new(Products::DiscountPrice).big_integer().null())
                    .col(ColumnDef::new(Products::Stock).integer().not_null().default(0))
                    .col(ColumnDef::new(Products::Status).boolean().not_null().default(true))
                    .col(timestamp(Products::CreatedAt))
                    .col(timestamp(Products::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_category_id")
                            .from(Products::Table, Products::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_shop_id")
                            .from(Products::Table, Products::ShopId)
                            .to(Shops::Table, Shops::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .check(Expr::cust(
                        "price >= 0 AND stock >= 0 AND (discount_price IS NULL OR (discount_price >= 0 AND discount_price < price))",
                    ))
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_products_category_id", Products::CategoryId),
            ("idx_products_shop_id", Products::ShopId),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Products::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(ProductImages::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ProductImages::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(ProductImages::ProductId).uuid().not_null())
                    .col(ColumnDef::new(ProductImages::Path).string().not_null())
                    .col(
                        ColumnDef::new(ProductImages::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(timestamp(ProductImages::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_images_product_id")
                            .from(ProductImages::Table, ProductImages::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductBrands::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ProductBrands::ProductId).uuid().not_null())
                    .col(ColumnDef::new(ProductBrands::BrandId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(ProductBrands::ProductId)
                            .col(ProductBrands::BrandId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_brands_product_id")
                            .from(ProductBrands::Table, ProductBrands::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_brands_brand_id")
                            .from(ProductBrands::Table, ProductBrands::BrandId)
                            .to(Brands::Table, Brands::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductCompositions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ProductCompositions::ProductId).uuid().not_null())
                    .col(
                        ColumnDef::new(ProductCompositions::CompositionId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProductCompositions::Qty).double().not_null())
                    .col(ColumnDef::new(ProductCompositions::QtyType).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(ProductCompositions::ProductId)
                            .col(ProductCompositions::CompositionId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_compositions_product_id")
                            .from(ProductCompositions::Table, ProductCompositions::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_compositions_composition_id")
                            .from(ProductCompositions::Table, ProductCompositions::CompositionId)
                            .to(Compositions::Table, Compositions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProductCompositions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductBrands::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductImages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Compositions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Brands::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await
    }
}

fn timestamp<C: IntoIden>(column: C) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    CategoryId,
    NameTm,
    NameEn,
    NameRu,
    Slug,
    Image,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Brands {
    Table,
    Id,
    Name,
    Slug,
    Image,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Compositions {
    Table,
    Id,
    NameTm,
    NameEn,
    NameRu,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Products {
    Table,
    Id,
    CategoryId,
    ShopId,
    NameTm,
    NameEn,
    NameRu,
    Slug,
    Description,
    Price,
    DiscountPrice,
    Stock,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ProductImages {
    Table,
    Id,
    ProductId,
    Path,
    Position,
    CreatedAt,
}

#[derive(Iden)]
enum ProductBrands {
    Table,
    ProductId,
    BrandId,
}

#[derive(Iden)]
enum ProductCompositions {
    Table,
    ProductId,
    CompositionId,
    Qty,
    QtyType,
}
