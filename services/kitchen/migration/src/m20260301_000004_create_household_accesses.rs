use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(HouseholdAccesses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HouseholdAccesses::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(HouseholdAccesses::HouseholdId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HouseholdAccesses::InvitedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(HouseholdAccesses::Name).string_len(255))
                    .col(
                        ColumnDef::new(HouseholdAccesses::Email)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HouseholdAccesses::Token)
                            .string_len(96)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(HouseholdAccesses::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(HouseholdAccesses::AcceptedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(HouseholdAccesses::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HouseholdAccesses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(HouseholdAccesses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(HouseholdAccesses::Table, HouseholdAccesses::HouseholdId)
                            .to(Households::Table, Households::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(HouseholdAccesses::Table, HouseholdAccesses::InvitedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(HouseholdAccesses::Table)
                    .col(HouseholdAccesses::HouseholdId)
                    .col(HouseholdAccesses::Status)
                    .name("idx_household_accesses_household_id_status")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(HouseholdAccesses::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum HouseholdAccesses {
    Table,
    Id,
    HouseholdId,
    InvitedBy,
    Name,
    Email,
    Token,
    Status,
    AcceptedAt,
    ExpiresAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Households {
    Table,
    Id,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
