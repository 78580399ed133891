//! Test utilities for Larder services.
//!
//! Provides `MockAuth` gateway headers for handler and extractor tests.
//! Import in `#[cfg(test)]` blocks and `tests/` only, never in production code.

pub mod auth;
