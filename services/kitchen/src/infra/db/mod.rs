//! sea-orm backed repositories.

mod catalog;
mod households;
mod inventory;
mod recipes;
mod users;

pub use catalog::{DbIngredientRepository, DbProductRepository};
pub use households::{DbHouseholdRepository, DbInviteRepository, DbMembershipRepository};
pub use inventory::DbInventoryRepository;
pub use recipes::{DbRecipeRepository, DbTagRepository};
pub use users::DbUserRepository;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use sea_orm::{DbErr, SqlErr};

/// Stored decimals keep three fractional digits.
const DECIMAL_SCALE: u32 = 3;

fn to_decimal(value: f64) -> Result<Decimal, DbErr> {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(DECIMAL_SCALE))
        .ok_or_else(|| DbErr::Custom(format!("{value} is not representable as a decimal")))
}

fn from_decimal(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
