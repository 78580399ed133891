#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};

use larder_domain::household::MembershipStatus;
use larder_domain::id::HouseholdId;
use larder_domain::pagination::{Page, PageRequest};

use crate::domain::types::{
    CatalogSearch, Household, HouseholdChanges, Ingredient, InventoryFields, InventoryItem, Invite,
    MemberView, Membership, MyHousehold, NewHousehold, NewIngredient, NewInvite, NewProduct,
    NewUser, OutboxEvent, Product, Recipe, RecipeDraft, RecipeFilter, RecipeTarget, Tag, User,
};
use crate::error::KitchenServiceError;

/// Repository for provisioned users.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, KitchenServiceError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, KitchenServiceError>;
    /// Fails with `UserAlreadyExists` when the email is taken.
    async fn create(&self, user: &NewUser) -> Result<User, KitchenServiceError>;
}

/// Repository for households. Soft-deleted households are invisible to every lookup
/// except `slug_exists`.
pub trait HouseholdRepository: Send + Sync {
    async fn find_by_id(&self, id: HouseholdId) -> Result<Option<Household>, KitchenServiceError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Household>, KitchenServiceError>;
    async fn slug_exists(&self, slug: &str) -> Result<bool, KitchenServiceError>;

    /// Insert the household and the creator's approved owner membership in one transaction.
    async fn create_with_owner(
        &self,
        household: &NewHousehold,
        owner_id: i64,
    ) -> Result<Household, KitchenServiceError>;

    async fn update(
        &self,
        id: HouseholdId,
        changes: &HouseholdChanges,
    ) -> Result<Household, KitchenServiceError>;

    async fn set_new_members(
        &self,
        id: HouseholdId,
        open: bool,
    ) -> Result<Household, KitchenServiceError>;

    async fn soft_delete(&self, id: HouseholdId) -> Result<(), KitchenServiceError>;

    /// Households where the user holds an approved membership, ordered by name.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<MyHousehold>, KitchenServiceError>;
}

/// Repository for household memberships.
pub trait MembershipRepository: Send + Sync {
    /// Membership of `user_id` in a live (not soft-deleted) household.
    async fn find(
        &self,
        household_id: HouseholdId,
        user_id: i64,
    ) -> Result<Option<Membership>, KitchenServiceError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Membership>, KitchenServiceError>;

    /// Memberships in one status joined with their users. Approved rows are ordered by
    /// approval time, others by creation time, newest first.
    async fn list(
        &self,
        household_id: HouseholdId,
        status: MembershipStatus,
    ) -> Result<Vec<MemberView>, KitchenServiceError>;

    /// Upsert `(household, user)` to a pending member request with approval metadata cleared.
    async fn request_join(
        &self,
        household_id: HouseholdId,
        user_id: i64,
    ) -> Result<Membership, KitchenServiceError>;

    /// Record a review outcome on a pending membership. `approved_at` is set only when
    /// approving. A membership that already left `pending` fails with `MembershipNotPending`.
    async fn review(
        &self,
        id: i64,
        status: MembershipStatus,
        reviewer_id: i64,
        at: DateTime<Utc>,
    ) -> Result<Membership, KitchenServiceError>;

    /// Hard delete. Returns `true` if a row was deleted.
    async fn delete(&self, id: i64) -> Result<bool, KitchenServiceError>;
}

/// Repository for household invites and their outbox events.
pub trait InviteRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Invite>, KitchenServiceError>;
    async fn find_pending_by_token(&self, token: &str)
    -> Result<Option<Invite>, KitchenServiceError>;
    async fn list_pending(&self, household_id: HouseholdId)
    -> Result<Vec<Invite>, KitchenServiceError>;

    /// Insert the invite and its outbox event in one transaction.
    async fn create_with_outbox(
        &self,
        invite: &NewInvite,
        event: &OutboxEvent,
    ) -> Result<Invite, KitchenServiceError>;

    /// Approve the redeemer's membership and mark the invite accepted in one transaction.
    /// Fails with `InviteNotFound` if the invite stopped being pending in the meantime.
    async fn redeem(
        &self,
        invite: &Invite,
        user_id: i64,
        at: DateTime<Utc>,
    ) -> Result<Membership, KitchenServiceError>;

    /// Move a pending invite to revoked. Returns `None` if it was not pending.
    async fn revoke(&self, id: i64) -> Result<Option<Invite>, KitchenServiceError>;
}

/// Repository for the recipe aggregate. Every method takes the tenant explicitly;
/// `None` leaves the query unscoped.
pub trait RecipeRepository: Send + Sync {
    async fn get(
        &self,
        tenant: Option<HouseholdId>,
        id: i64,
    ) -> Result<Option<Recipe>, KitchenServiceError>;

    async fn list(
        &self,
        tenant: Option<HouseholdId>,
        filter: &RecipeFilter,
        page: PageRequest,
    ) -> Result<Page<Recipe>, KitchenServiceError>;

    /// Persist scalars, steps, ingredient lines and tag links in one transaction, replacing
    /// existing children wholesale. Fails with `RecipeNotFound` when replacing a recipe
    /// outside the tenant.
    async fn write(
        &self,
        tenant: Option<HouseholdId>,
        target: RecipeTarget,
        draft: &RecipeDraft,
    ) -> Result<Recipe, KitchenServiceError>;

    /// Soft delete. Returns `true` if a live recipe was deleted.
    async fn soft_delete(
        &self,
        tenant: Option<HouseholdId>,
        id: i64,
    ) -> Result<bool, KitchenServiceError>;
}

/// Read side of the tag table. Tags are created by the recipe writer.
pub trait TagRepository: Send + Sync {
    async fn search(&self, q: Option<&str>, limit: u64) -> Result<Vec<Tag>, KitchenServiceError>;
}

/// Repository for the global ingredient catalog.
pub trait IngredientRepository: Send + Sync {
    async fn search(&self, search: &CatalogSearch)
    -> Result<Vec<Ingredient>, KitchenServiceError>;
    async fn find_by_id(
        &self,
        id: i64,
        include_deleted: bool,
    ) -> Result<Option<Ingredient>, KitchenServiceError>;
    async fn find_id_by_slug(
        &self,
        slug: &str,
        include_deleted: bool,
    ) -> Result<Option<i64>, KitchenServiceError>;
    /// Includes soft-deleted rows, which keep their slug reserved.
    async fn slug_exists(&self, slug: &str) -> Result<bool, KitchenServiceError>;
    async fn name_exists(&self, name: &str) -> Result<bool, KitchenServiceError>;
    async fn create(&self, ingredient: &NewIngredient) -> Result<Ingredient, KitchenServiceError>;
    /// Set or clear `deleted_at`. Returns the updated row, or `None` if it does not exist.
    async fn set_deleted_at(
        &self,
        id: i64,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Ingredient>, KitchenServiceError>;
}

/// Repository for the global product catalog.
pub trait ProductRepository: Send + Sync {
    async fn search(&self, search: &CatalogSearch) -> Result<Vec<Product>, KitchenServiceError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, KitchenServiceError>;
    async fn slug_exists(&self, slug: &str) -> Result<bool, KitchenServiceError>;
    async fn create(&self, product: &NewProduct) -> Result<Product, KitchenServiceError>;
}

/// Repository for pantry items. Every method takes the tenant explicitly.
pub trait InventoryRepository: Send + Sync {
    /// Newest first; `q` matches category, location or product name.
    async fn list(
        &self,
        tenant: Option<HouseholdId>,
        q: Option<&str>,
        limit: u64,
    ) -> Result<Vec<InventoryItem>, KitchenServiceError>;

    /// Distinct non-empty locations, alphabetical.
    async fn locations(
        &self,
        tenant: Option<HouseholdId>,
    ) -> Result<Vec<String>, KitchenServiceError>;

    async fn get(
        &self,
        tenant: Option<HouseholdId>,
        id: i64,
    ) -> Result<Option<InventoryItem>, KitchenServiceError>;

    async fn create(
        &self,
        household_id: HouseholdId,
        fields: &InventoryFields,
    ) -> Result<InventoryItem, KitchenServiceError>;

    /// Returns `None` when the item does not exist within the tenant.
    async fn update(
        &self,
        tenant: Option<HouseholdId>,
        id: i64,
        fields: &InventoryFields,
    ) -> Result<Option<InventoryItem>, KitchenServiceError>;

    async fn soft_delete(
        &self,
        tenant: Option<HouseholdId>,
        id: i64,
    ) -> Result<bool, KitchenServiceError>;
}
