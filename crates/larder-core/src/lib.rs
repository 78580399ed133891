//! HTTP and persistence plumbing shared by Larder services.

pub mod error;
pub mod health;
pub mod middleware;
pub mod sea_ext;
pub mod serde;
pub mod tracing;
