//! Household membership roles, statuses and invite states.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role a user holds inside a household.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipRole {
    Owner,
    Admin,
    Member,
}

impl MembershipRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    /// Owners and admins may review requests, invite, and edit household settings.
    pub fn can_manage(self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }
}

impl fmt::Display for MembershipRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a membership row.
///
/// ```text
/// pending --approve--> approved
/// pending --reject---> rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    Pending,
    Approved,
    Rejected,
}

/// Decision a manager takes on a pending join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Review {
    Approve,
    Reject,
}

/// Returned when a review targets a membership that is no longer pending.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("membership is {0}, only pending requests can be reviewed")]
pub struct NotPending(pub MembershipStatus);

impl MembershipStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Apply a review decision. Only `Pending` can move.
    pub fn review(self, decision: Review) -> Result<Self, NotPending> {
        match (self, decision) {
            (Self::Pending, Review::Approve) => Ok(Self::Approved),
            (Self::Pending, Review::Reject) => Ok(Self::Rejected),
            (other, _) => Err(NotPending(other)),
        }
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of an emailed household invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Revoked,
}

impl InviteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Revoked => "revoked",
        }
    }
}

impl fmt::Display for InviteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored string does not name a known variant.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for MembershipRole {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            other => Err(UnknownVariant {
                kind: "membership role",
                value: other.to_owned(),
            }),
        }
    }
}

impl FromStr for MembershipStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownVariant {
                kind: "membership status",
                value: other.to_owned(),
            }),
        }
    }
}

impl FromStr for InviteStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "revoked" => Ok(Self::Revoked),
            other => Err(UnknownVariant {
                kind: "invite status",
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_approve_or_reject_pending() {
        assert_eq!(
            MembershipStatus::Pending.review(Review::Approve),
            Ok(MembershipStatus::Approved)
        );
        assert_eq!(
            MembershipStatus::Pending.review(Review::Reject),
            Ok(MembershipStatus::Rejected)
        );
    }

    #[test]
    fn should_refuse_to_review_settled_memberships() {
        for status in [MembershipStatus::Approved, MembershipStatus::Rejected] {
            for decision in [Review::Approve, Review::Reject] {
                assert_eq!(status.review(decision), Err(NotPending(status)));
            }
        }
    }

    #[test]
    fn should_only_let_owner_and_admin_manage() {
        assert!(MembershipRole::Owner.can_manage());
        assert!(MembershipRole::Admin.can_manage());
        assert!(!MembershipRole::Member.can_manage());
    }

    #[test]
    fn should_round_trip_variants_via_display_and_from_str() {
        for role in [
            MembershipRole::Owner,
            MembershipRole::Admin,
            MembershipRole::Member,
        ] {
            assert_eq!(role.to_string().parse::<MembershipRole>(), Ok(role));
        }
        for status in [
            MembershipStatus::Pending,
            MembershipStatus::Approved,
            MembershipStatus::Rejected,
        ] {
            assert_eq!(status.to_string().parse::<MembershipStatus>(), Ok(status));
        }
        for status in [
            InviteStatus::Pending,
            InviteStatus::Accepted,
            InviteStatus::Revoked,
        ] {
            assert_eq!(status.to_string().parse::<InviteStatus>(), Ok(status));
        }
    }

    #[test]
    fn should_serialize_as_snake_case() {
        assert_eq!(
            serde_json::to_string(&MembershipStatus::Approved).unwrap(),
            "\"approved\""
        );
        assert_eq!(
            serde_json::to_string(&MembershipRole::Owner).unwrap(),
            "\"owner\""
        );
    }

    #[test]
    fn should_reject_unknown_role() {
        let err = "chef".parse::<MembershipRole>().unwrap_err();
        assert_eq!(err.kind, "membership role");
    }
}
