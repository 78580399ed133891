use sea_orm::DatabaseConnection;

use crate::infra::db::{
    DbHouseholdRepository, DbIngredientRepository, DbInventoryRepository, DbInviteRepository,
    DbMembershipRepository, DbProductRepository, DbRecipeRepository, DbTagRepository,
    DbUserRepository,
};

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    /// Domain attribute of the active-household cookie.
    pub cookie_domain: String,
    pub invite_ttl_days: i64,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn household_repo(&self) -> DbHouseholdRepository {
        DbHouseholdRepository {
            db: self.db.clone(),
        }
    }

    pub fn membership_repo(&self) -> DbMembershipRepository {
        DbMembershipRepository {
            db: self.db.clone(),
        }
    }

    pub fn invite_repo(&self) -> DbInviteRepository {
        DbInviteRepository {
            db: self.db.clone(),
        }
    }

    pub fn recipe_repo(&self) -> DbRecipeRepository {
        DbRecipeRepository {
            db: self.db.clone(),
        }
    }

    pub fn tag_repo(&self) -> DbTagRepository {
        DbTagRepository {
            db: self.db.clone(),
        }
    }

    pub fn ingredient_repo(&self) -> DbIngredientRepository {
        DbIngredientRepository {
            db: self.db.clone(),
        }
    }

    pub fn product_repo(&self) -> DbProductRepository {
        DbProductRepository {
            db: self.db.clone(),
        }
    }

    pub fn inventory_repo(&self) -> DbInventoryRepository {
        DbInventoryRepository {
            db: self.db.clone(),
        }
    }
}
