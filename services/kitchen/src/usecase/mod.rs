pub mod catalog;
pub mod household;
pub mod inventory;
pub mod invite;
pub mod membership;
pub mod recipe;
pub mod tag;
pub mod tenancy;
pub mod user;

#[cfg(test)]
mod fakes;
