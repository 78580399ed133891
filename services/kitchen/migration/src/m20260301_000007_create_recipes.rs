use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Recipes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Recipes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Recipes::HouseholdId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Recipes::CreatedByUserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Recipes::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Recipes::Description).text())
                    .col(ColumnDef::new(Recipes::PrepTimeMinutes).integer())
                    .col(ColumnDef::new(Recipes::CookTimeMinutes).integer())
                    .col(ColumnDef::new(Recipes::Servings).integer())
                    .col(
                        ColumnDef::new(Recipes::SourceType)
                            .string_len(32)
                            .not_null()
                            .default("manual"),
                    )
                    .col(ColumnDef::new(Recipes::SourceUrl).string_len(2048))
                    .col(ColumnDef::new(Recipes::Nutrition).json_binary())
                    .col(
                        ColumnDef::new(Recipes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Recipes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Recipes::DeletedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Recipes::Table, Recipes::HouseholdId)
                            .to(Households::Table, Households::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Recipes::Table, Recipes::CreatedByUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Recipes::Table)
                    .col(Recipes::HouseholdId)
                    .col(Recipes::Title)
                    .name("idx_recipes_household_id_title")
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RecipeSteps::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecipeSteps::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RecipeSteps::RecipeId).big_integer().not_null())
                    .col(ColumnDef::new(RecipeSteps::Position).integer().not_null())
                    .col(ColumnDef::new(RecipeSteps::Instruction).text().not_null())
                    .col(ColumnDef::new(RecipeSteps::TimerSeconds).integer())
                    .col(
                        ColumnDef::new(RecipeSteps::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(RecipeSteps::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(RecipeSteps::Table, RecipeSteps::RecipeId)
                            .to(Recipes::Table, Recipes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(RecipeSteps::Table)
                    .col(RecipeSteps::RecipeId)
                    .col(RecipeSteps::Position)
                    .unique()
                    .name("uq_recipe_steps_recipe_id_position")
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RecipeIngredients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecipeIngredients::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RecipeIngredients::RecipeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecipeIngredients::Position)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RecipeIngredients::IngredientId).big_integer())
                    .col(ColumnDef::new(RecipeIngredients::IngredientText).string_len(255))
                    .col(ColumnDef::new(RecipeIngredients::Amount).decimal_len(10, 3))
                    .col(ColumnDef::new(RecipeIngredients::Unit).string_len(32))
                    .col(ColumnDef::new(RecipeIngredients::PreparationNote).string_len(512))
                    .col(
                        ColumnDef::new(RecipeIngredients::IsOptional)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(RecipeIngredients::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(RecipeIngredients::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(RecipeIngredients::Table, RecipeIngredients::RecipeId)
                            .to(Recipes::Table, Recipes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(RecipeIngredients::Table, RecipeIngredients::IngredientId)
                            .to(Ingredients::Table, Ingredients::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(RecipeIngredients::Table)
                    .col(RecipeIngredients::RecipeId)
                    .col(RecipeIngredients::Position)
                    .name("idx_recipe_ingredients_recipe_id_position")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(RecipeIngredients::Table)
                    .col(RecipeIngredients::IngredientId)
                    .name("idx_recipe_ingredients_ingredient_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RecipeIngredients::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecipeSteps::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Recipes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Recipes {
    Table,
    Id,
    HouseholdId,
    CreatedByUserId,
    Title,
    Description,
    PrepTimeMinutes,
    CookTimeMinutes,
    Servings,
    SourceType,
    SourceUrl,
    Nutrition,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(Iden)]
enum RecipeSteps {
    Table,
    Id,
    RecipeId,
    Position,
    Instruction,
    TimerSeconds,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum RecipeIngredients {
    Table,
    Id,
    RecipeId,
    Position,
    IngredientId,
    IngredientText,
    Amount,
    Unit,
    PreparationNote,
    IsOptional,
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

#[derive(Iden)]
enum Ingredients {
    Table,
    Id,
}
