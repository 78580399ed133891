//! sea-orm entities for the kitchen service.

pub mod household_accesses;
pub mod household_memberships;
pub mod households;
pub mod ingredients;
pub mod inventory_items;
pub mod outbox_events;
pub mod products;
pub mod recipe_ingredients;
pub mod recipe_steps;
pub mod recipe_tags;
pub mod recipes;
pub mod tags;
pub mod users;
