use sea_orm::entity::prelude::*;

/// A household: the tenant that owns recipes and pantry items.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "households")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub locale: String,
    pub currency: String,
    pub new_members: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::household_memberships::Entity")]
    HouseholdMemberships,
    #[sea_orm(has_many = "super::household_accesses::Entity")]
    HouseholdAccesses,
    #[sea_orm(has_many = "super::recipes::Entity")]
    Recipes,
    #[sea_orm(has_many = "super::inventory_items::Entity")]
    InventoryItems,
}

impl Related<super::household_memberships::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HouseholdMemberships.def()
    }
}

impl Related<super::household_accesses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HouseholdAccesses.def()
    }
}

impl Related<super::recipes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipes.def()
    }
}

impl Related<super::inventory_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
