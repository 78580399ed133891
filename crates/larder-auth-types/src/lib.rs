//! Request identity and session types shared across Larder services.
//!
//! Provides the gateway `IdentityHeaders` extractor and the active-household session cookie.

pub mod identity;
pub mod session;
