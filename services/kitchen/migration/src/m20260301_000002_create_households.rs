use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Households::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Households::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Households::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Households::Slug)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Households::Locale)
                            .string_len(16)
                            .not_null()
                            .default("en"),
                    )
                    .col(
                        ColumnDef::new(Households::Currency)
                            .string_len(3)
                            .not_null()
                            .default("GBP"),
                    )
                    .col(
                        ColumnDef::new(Households::NewMembers)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Households::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Households::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Households::DeletedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Households::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Households {
    Table,
    Id,
    Name,
    Slug,
    Locale,
    Currency,
    NewMembers,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
