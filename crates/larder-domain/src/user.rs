//! User domain types.

use serde::{Deserialize, Serialize};

/// Account privilege level carried in the gateway's role header.
///
/// Wire format: `u8` (0 = Member, 1 = Staff, 2 = Service).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Member = 0,
    Staff = 1,
    Service = 2,
}

impl UserRole {
    /// Convert from `u8` wire value. Returns `None` for unknown values.
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Member),
            1 => Some(Self::Staff),
            2 => Some(Self::Service),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Only service accounts may provision users into this service.
    pub fn can_provision_users(self) -> bool {
        self >= Self::Service
    }
}
