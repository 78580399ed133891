use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InventoryItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventoryItems::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(InventoryItems::HouseholdId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryItems::ProductId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryItems::Quantity)
                            .decimal_len(12, 3)
                            .not_null(),
                    )
                    .col(ColumnDef::new(InventoryItems::Unit).string_len(32).not_null())
                    .col(ColumnDef::new(InventoryItems::PurchasedAt).date())
                    .col(ColumnDef::new(InventoryItems::ExpiresAt).date())
                    .col(ColumnDef::new(InventoryItems::Category).string_len(100))
                    .col(ColumnDef::new(InventoryItems::Location).string_len(100))
                    .col(
                        ColumnDef::new(InventoryItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(InventoryItems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(InventoryItems::DeletedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .from(InventoryItems::Table, InventoryItems::HouseholdId)
                            .to(Households::Table, Households::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(InventoryItems::Table, InventoryItems::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(InventoryItems::Table)
                    .col(InventoryItems::HouseholdId)
                    .col((InventoryItems::CreatedAt, IndexOrder::Desc))
                    .name("idx_inventory_items_household_id_created_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InventoryItems::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum InventoryItems {
    Table,
    Id,
    HouseholdId,
    ProductId,
    Quantity,
    Unit,
    PurchasedAt,
    ExpiresAt,
    Category,
    Location,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(Iden)]
enum Households {
    Table,
    Id,
}

#[derive(Iden)]
enum Products {
    Table,
    Id,
}
