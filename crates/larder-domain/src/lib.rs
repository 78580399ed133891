//! Domain types shared across Larder services.
//!
//! This crate contains only pure types with no framework dependencies.
//! Nothing here performs I/O; storage lookups are injected as closures.

pub mod household;
pub mod id;
pub mod pagination;
pub mod recipe;
pub mod slug;
pub mod tenancy;
pub mod user;
