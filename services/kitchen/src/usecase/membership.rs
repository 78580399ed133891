use chrono::Utc;

use larder_domain::household::{MembershipRole, MembershipStatus, Review};
use larder_domain::id::HouseholdId;

use crate::domain::repository::{HouseholdRepository, MembershipRepository};
use crate::domain::types::{MemberView, Membership};
use crate::domain::validation::{ValidationErrors, check_required};
use crate::error::KitchenServiceError;

/// Approved owner/admin membership of `user_id`, or `NotHouseholdManager`.
pub async fn require_manager<M: MembershipRepository>(
    memberships: &M,
    household_id: HouseholdId,
    user_id: i64,
) -> Result<Membership, KitchenServiceError> {
    memberships
        .find(household_id, user_id)
        .await?
        .filter(Membership::can_manage)
        .ok_or(KitchenServiceError::NotHouseholdManager)
}

// ── RequestJoin ──────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum JoinOutcome {
    AlreadyMember,
    Requested(Membership),
}

pub struct RequestJoinUseCase<H, M>
where
    H: HouseholdRepository,
    M: MembershipRepository,
{
    pub households: H,
    pub memberships: M,
}

impl<H, M> RequestJoinUseCase<H, M>
where
    H: HouseholdRepository,
    M: MembershipRepository,
{
    pub async fn execute(
        &self,
        user_id: i64,
        slug: &str,
    ) -> Result<JoinOutcome, KitchenServiceError> {
        let mut errors = ValidationErrors::new();
        check_required(&mut errors, "slug", slug, 64);
        errors.into_result()?;

        let household = self
            .households
            .find_by_slug(slug.trim())
            .await?
            .ok_or(KitchenServiceError::HouseholdNotFound)?;
        if !household.new_members {
            return Err(KitchenServiceError::HouseholdClosed);
        }

        let existing = self.memberships.find(household.id, user_id).await?;
        if existing.is_some_and(|m| m.is_approved()) {
            return Ok(JoinOutcome::AlreadyMember);
        }

        let membership = self.memberships.request_join(household.id, user_id).await?;
        tracing::info!(household_id = household.id.0, user_id, "join request submitted");
        Ok(JoinOutcome::Requested(membership))
    }
}

// ── ListJoinRequests ─────────────────────────────────────────────────────────

pub struct ListJoinRequestsUseCase<M: MembershipRepository> {
    pub memberships: M,
}

impl<M: MembershipRepository> ListJoinRequestsUseCase<M> {
    pub async fn execute(
        &self,
        user_id: i64,
        household_id: HouseholdId,
    ) -> Result<Vec<MemberView>, KitchenServiceError> {
        require_manager(&self.memberships, household_id, user_id).await?;
        self.memberships
            .list(household_id, MembershipStatus::Pending)
            .await
    }
}

// ── ReviewMembership ─────────────────────────────────────────────────────────

pub struct ReviewMembershipUseCase<M: MembershipRepository> {
    pub memberships: M,
}

impl<M: MembershipRepository> ReviewMembershipUseCase<M> {
    pub async fn execute(
        &self,
        user_id: i64,
        membership_id: i64,
        decision: Review,
    ) -> Result<Membership, KitchenServiceError> {
        let membership = self
            .memberships
            .find_by_id(membership_id)
            .await?
            .ok_or(KitchenServiceError::MembershipNotFound)?;
        require_manager(&self.memberships, membership.household_id, user_id).await?;

        let status = membership
            .status
            .review(decision)
            .map_err(|_| KitchenServiceError::MembershipNotPending)?;
        self.memberships
            .review(membership_id, status, user_id, Utc::now())
            .await
    }
}

// ── RemoveMember ─────────────────────────────────────────────────────────────

pub struct RemoveMemberUseCase<M: MembershipRepository> {
    pub memberships: M,
}

impl<M: MembershipRepository> RemoveMemberUseCase<M> {
    pub async fn execute(
        &self,
        user_id: i64,
        membership_id: i64,
    ) -> Result<(), KitchenServiceError> {
        let membership = self
            .memberships
            .find_by_id(membership_id)
            .await?
            .ok_or(KitchenServiceError::MembershipNotFound)?;
        require_manager(&self.memberships, membership.household_id, user_id).await?;

        if membership.role == MembershipRole::Owner {
            return Err(KitchenServiceError::CannotRemoveOwner);
        }
        if !self.memberships.delete(membership_id).await? {
            return Err(KitchenServiceError::MembershipNotFound);
        }
        Ok(())
    }
}
