use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(HouseholdMemberships::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HouseholdMemberships::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(HouseholdMemberships::HouseholdId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HouseholdMemberships::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HouseholdMemberships::Role)
                            .string_len(16)
                            .not_null()
                            .default("member"),
                    )
                    .col(
                        ColumnDef::new(HouseholdMemberships::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(HouseholdMemberships::ApprovedAt)
                            .timestamp_with_time_zone(),
                    )
                    .col(ColumnDef::new(HouseholdMemberships::ApprovedBy).big_integer())
                    .col(
                        ColumnDef::new(HouseholdMemberships::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(HouseholdMemberships::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(HouseholdMemberships::Table, HouseholdMemberships::HouseholdId)
                            .to(Households::Table, Households::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(HouseholdMemberships::Table, HouseholdMemberships::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(HouseholdMemberships::Table, HouseholdMemberships::ApprovedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(HouseholdMemberships::Table)
                    .col(HouseholdMemberships::HouseholdId)
                    .col(HouseholdMemberships::UserId)
                    .unique()
                    .name("uq_household_memberships_household_id_user_id")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(HouseholdMemberships::Table)
                    .col(HouseholdMemberships::UserId)
                    .col(HouseholdMemberships::Status)
                    .name("idx_household_memberships_user_id_status")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(HouseholdMemberships::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum HouseholdMemberships {
    Table,
    Id,
    HouseholdId,
    UserId,
    Role,
    Status,
    ApprovedAt,
    ApprovedBy,
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
