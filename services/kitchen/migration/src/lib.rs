pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_users;
mod m20260301_000002_create_households;
mod m20260301_000003_create_household_memberships;
mod m20260301_000004_create_household_accesses;
mod m20260301_000005_create_catalog;
mod m20260301_000006_create_inventory_items;
mod m20260301_000007_create_recipes;
mod m20260301_000008_create_tags;
mod m20260301_000009_create_outbox_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_users::Migration),
            Box::new(m20260301_000002_create_households::Migration),
            Box::new(m20260301_000003_create_household_memberships::Migration),
            Box::new(m20260301_000004_create_household_accesses::Migration),
            Box::new(m20260301_000005_create_catalog::Migration),
            Box::new(m20260301_000006_create_inventory_items::Migration),
            Box::new(m20260301_000007_create_recipes::Migration),
            Box::new(m20260301_000008_create_tags::Migration),
            Box::new(m20260301_000009_create_outbox_events::Migration),
        ]
    }
}
