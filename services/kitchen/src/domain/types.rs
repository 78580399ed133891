use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use larder_domain::household::{InviteStatus, MembershipRole, MembershipStatus};
use larder_domain::id::HouseholdId;
use larder_domain::recipe::SourceType;

// ── Users ────────────────────────────────────────────────────────────────────

/// User account known to the kitchen service.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: u8,
}

// ── Households ───────────────────────────────────────────────────────────────

pub const DEFAULT_LOCALE: &str = "en";
pub const DEFAULT_CURRENCY: &str = "GBP";
pub const HOUSEHOLD_SLUG_FALLBACK: &str = "household";

#[derive(Debug, Clone)]
pub struct Household {
    pub id: HouseholdId,
    pub name: String,
    pub slug: String,
    pub locale: String,
    pub currency: String,
    pub new_members: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewHousehold {
    pub name: String,
    pub slug: String,
    pub locale: String,
    pub currency: String,
    pub new_members: bool,
}

/// Partial update of household details. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct HouseholdChanges {
    pub name: Option<String>,
    pub locale: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Membership {
    pub id: i64,
    pub household_id: HouseholdId,
    pub user_id: i64,
    pub role: MembershipRole,
    pub status: MembershipStatus,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Membership {
    /// Only approved memberships grant access to household data.
    pub fn is_approved(&self) -> bool {
        self.status == MembershipStatus::Approved
    }

    pub fn can_manage(&self) -> bool {
        self.is_approved() && self.role.can_manage()
    }
}

/// Membership row joined with the member's user record.
#[derive(Debug, Clone)]
pub struct MemberView {
    pub membership: Membership,
    pub name: String,
    pub email: String,
}

/// A household the caller belongs to, with their role in it.
#[derive(Debug, Clone)]
pub struct MyHousehold {
    pub household: Household,
    pub role: MembershipRole,
}

// ── Invites ──────────────────────────────────────────────────────────────────

/// Invite token length in characters.
pub const INVITE_TOKEN_LEN: usize = 64;

/// Default invite lifetime in days.
pub const DEFAULT_INVITE_TTL_DAYS: i64 = 7;

pub const INVITE_CREATED_EVENT: &str = "household_invite_created";

#[derive(Debug, Clone)]
pub struct Invite {
    pub id: i64,
    pub household_id: HouseholdId,
    pub invited_by: i64,
    pub name: Option<String>,
    pub email: String,
    pub token: String,
    pub status: InviteStatus,
    pub accepted_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Invite {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone)]
pub struct NewInvite {
    pub household_id: HouseholdId,
    pub invited_by: i64,
    pub name: Option<String>,
    pub email: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Outbox event written in the same transaction as the invite.
#[derive(Debug, Clone)]
pub struct OutboxEvent {
    pub id: Uuid,
    pub kind: String,
    pub payload: serde_json::Value,
    pub idempotency_key: String,
}

/// Relative URL the invitee follows: login when they already have an account, else register.
pub fn invite_path(token: &str, has_account: bool) -> String {
    let entry = if has_account { "login" } else { "register" };
    format!("/{entry}?invite_token={token}")
}

// ── Catalog ──────────────────────────────────────────────────────────────────

pub const INGREDIENT_SLUG_FALLBACK: &str = "ingredient";
pub const PRODUCT_SLUG_FALLBACK: &str = "product";

#[derive(Debug, Clone)]
pub struct Ingredient {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewIngredient {
    pub slug: String,
    pub name: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Product {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub company: Option<String>,
    pub ingredient_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub slug: String,
    pub name: String,
    pub company: Option<String>,
    pub ingredient_id: Option<i64>,
}

/// Free-text catalog search shared by ingredients, products and tags.
#[derive(Debug, Clone, Default)]
pub struct CatalogSearch {
    pub q: Option<String>,
    pub limit: u64,
    pub with_deleted: bool,
}

// ── Inventory ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct InventoryItem {
    pub id: i64,
    pub household_id: HouseholdId,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: f64,
    pub unit: String,
    pub purchased_at: Option<NaiveDate>,
    pub expires_at: Option<NaiveDate>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryFields {
    pub product_id: i64,
    pub quantity: f64,
    pub unit: String,
    pub purchased_at: Option<NaiveDate>,
    pub expires_at: Option<NaiveDate>,
    pub category: Option<String>,
    pub location: Option<String>,
}

// ── Recipes ──────────────────────────────────────────────────────────────────

pub const MAX_RECIPE_STEPS: usize = 100;
pub const MAX_RECIPE_INGREDIENTS: usize = 200;
pub const MAX_RECIPE_TAGS: usize = 25;

/// Recipe aggregate as read back after a write or by id.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub id: i64,
    pub household_id: HouseholdId,
    pub created_by_user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub prep_time_minutes: Option<i32>,
    pub cook_time_minutes: Option<i32>,
    pub servings: Option<i32>,
    pub source_type: SourceType,
    pub source_url: Option<String>,
    pub nutrition: Option<serde_json::Value>,
    /// Ordered by position.
    pub steps: Vec<RecipeStep>,
    /// Ordered by position.
    pub ingredients: Vec<RecipeIngredientLine>,
    /// Ordered by name.
    pub tags: Vec<Tag>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeStep {
    pub id: i64,
    pub position: i32,
    pub instruction: String,
    pub timer_seconds: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeIngredientLine {
    pub id: i64,
    pub position: i32,
    pub ingredient: Option<IngredientRef>,
    pub ingredient_text: Option<String>,
    pub amount: Option<f64>,
    pub unit: Option<String>,
    pub preparation_note: Option<String>,
    pub is_optional: bool,
}

/// Display data of the catalog ingredient a line links to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientRef {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: i64,
    pub slug: String,
    pub name: String,
}

/// Scalar recipe fields, already validated and trimmed.
#[derive(Debug, Clone, Default)]
pub struct RecipeFields {
    pub title: String,
    pub description: Option<String>,
    pub prep_time_minutes: Option<i32>,
    pub cook_time_minutes: Option<i32>,
    pub servings: Option<i32>,
    pub source_type: SourceType,
    pub source_url: Option<String>,
    pub nutrition: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDraft {
    pub instruction: String,
    pub timer_seconds: Option<i32>,
}

/// Ingredient line with its slug already resolved to an id (or left unlinked).
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientLineDraft {
    pub ingredient_id: Option<i64>,
    pub ingredient_text: Option<String>,
    pub amount: Option<f64>,
    pub unit: Option<String>,
    pub preparation_note: Option<String>,
    pub is_optional: bool,
}

/// Normalized tag: unique slug plus the display name first seen for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDraft {
    pub slug: String,
    pub name: String,
}

/// Everything the aggregate writer persists. Children are stored in vector order.
#[derive(Debug, Clone, Default)]
pub struct RecipeDraft {
    pub fields: RecipeFields,
    pub steps: Vec<StepDraft>,
    pub ingredients: Vec<IngredientLineDraft>,
    pub tags: Vec<TagDraft>,
}

/// Whether a write creates a new recipe or replaces an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeTarget {
    Create {
        household_id: HouseholdId,
        created_by_user_id: i64,
    },
    Replace {
        recipe_id: i64,
    },
}

/// Filters for the recipe list. All present filters must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeFilter {
    /// Lowercased substring matched against title or description.
    pub q: Option<String>,
    /// Any of these tag slugs.
    pub tag_slugs: Vec<String>,
    pub ingredient_id: Option<i64>,
    pub ingredient_slug: Option<String>,
    pub max_cook_time: Option<i32>,
    pub source_type: Option<SourceType>,
}
