use sea_orm::entity::prelude::*;

/// User account provisioned into the kitchen service.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub role: i16,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::household_memberships::Entity")]
    HouseholdMemberships,
}

impl Related<super::household_memberships::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HouseholdMemberships.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
