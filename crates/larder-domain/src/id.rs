//! Newtype wrappers for domain identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifies a household (the tenant boundary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HouseholdId(pub i64);

impl HouseholdId {
    /// Accept only ids that could name a stored household (`BIGSERIAL` starts at 1).
    pub fn new(raw: i64) -> Option<Self> {
        (raw > 0).then_some(Self(raw))
    }
}

impl fmt::Display for HouseholdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Error returned when a string is not a positive household id.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid household id: {0:?}")]
pub struct InvalidHouseholdId(pub String);

impl FromStr for HouseholdId {
    type Err = InvalidHouseholdId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| InvalidHouseholdId(s.to_owned()))
    }
}

impl From<HouseholdId> for i64 {
    fn from(id: HouseholdId) -> Self {
        id.0
    }
}
