//! Per-request tenant context.
//!
//! A request either operates inside one household or has not picked one yet.
//! The value is built once per request and passed explicitly down to storage.

use crate::id::HouseholdId;

/// Outcome of household context resolution for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HouseholdContext {
    #[default]
    Unresolved,
    Resolved(HouseholdId),
}

impl HouseholdContext {
    pub fn current_household_id(&self) -> Option<HouseholdId> {
        match self {
            Self::Resolved(id) => Some(*id),
            Self::Unresolved => None,
        }
    }
}

/// Pick the household a new tenant-owned record belongs to.
///
/// An explicitly supplied household wins; otherwise the active tenant is used.
/// `None` means the caller has no household to write into. The explicit arm is for
/// import paths that write outside a request context.
pub fn stamp_household(
    explicit: Option<HouseholdId>,
    tenant: Option<HouseholdId>,
) -> Option<HouseholdId> {
    explicit.or(tenant)
}
