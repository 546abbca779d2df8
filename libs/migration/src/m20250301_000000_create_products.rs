use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(pk_auto(Products::Id))
                    .col(string_len(Products::Name, 200).not_null())
                    .col(text(Products::Description).default(""))
                    .col(string_len(Products::Brand, 100).default(""))
                    .col(decimal_len(Products::Price, 12, 2).not_null())
                    .col(string_len(Products::Category, 100).default(""))
                    .col(date(Products::ReleaseDate).not_null())
                    .col(boolean(Products::ProductAvailable).default(true))
                    .col(integer(Products::StockQuantity).not_null().default(0))
                    .col(string_len_null(Products::ImageName, 255))
                    .col(string_len_null(Products::ImageType, 100))
                    .col(ColumnDef::new(Products::ImageData).binary().null())
                    .to_owned(),
            )
            .await?;

        // Last line of defence against overselling
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                ALTER TABLE products
                    ADD CONSTRAINT products_stock_quantity_non_negative
                    CHECK (stock_quantity >= 0)
                "#,
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_category")
                    .table(Products::Table)
                    .col(Products::Category)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Name,
    Description,
    Brand,
    Price,
    Category,
    ReleaseDate,
    ProductAvailable,
    StockQuantity,
    ImageName,
    ImageType,
    ImageData,
}
