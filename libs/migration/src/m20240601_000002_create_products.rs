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
                    .col(string_len(Products::Name, 100))
                    .col(text(Products::Description))
                    .col(string_len(Products::Manufacturer, 100))
                    .col(string_len_uniq(Products::SerialNumber, 50))
                    .col(date(Products::DateOfManufacture))
                    .col(string_len_null(Products::WarrantyInformation, 100))
                    .col(string_len(Products::Category, 50))
                    .to_owned(),
            )
            .await
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
    Manufacturer,
    SerialNumber,
    DateOfManufacture,
    WarrantyInformation,
    Category,
}
