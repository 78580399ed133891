use larder_domain::household::{MembershipRole, MembershipStatus};
use larder_domain::id::HouseholdId;
use larder_domain::slug::next_unique_slug;

use crate::domain::repository::{HouseholdRepository, InviteRepository, MembershipRepository};
use crate::domain::types::{
    DEFAULT_CURRENCY, DEFAULT_LOCALE, HOUSEHOLD_SLUG_FALLBACK, Household, HouseholdChanges,
    Invite, MemberView, MyHousehold, NewHousehold,
};
use crate::domain::validation::{ValidationErrors, check_max_len, check_required, non_blank};
use crate::error::KitchenServiceError;
use crate::usecase::membership::require_manager;

fn check_currency(errors: &mut ValidationErrors, currency: Option<&str>) {
    if let Some(currency) = currency {
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            errors.add("currency", "currency must be a 3-letter code");
        }
    }
}

// ── CreateHousehold ──────────────────────────────────────────────────────────

pub struct CreateHouseholdInput {
    pub name: String,
    pub locale: Option<String>,
    pub currency: Option<String>,
}

pub struct CreateHouseholdUseCase<H: HouseholdRepository> {
    pub households: H,
}

impl<H: HouseholdRepository> CreateHouseholdUseCase<H> {
    /// The creator becomes the approved owner.
    pub async fn execute(
        &self,
        user_id: i64,
        input: CreateHouseholdInput,
    ) -> Result<Household, KitchenServiceError> {
        let locale = non_blank(input.locale.as_deref());
        let currency = non_blank(input.currency.as_deref());

        let mut errors = ValidationErrors::new();
        check_required(&mut errors, "name", &input.name, 255);
        check_max_len(&mut errors, "locale", locale, 12);
        check_currency(&mut errors, currency);
        errors.into_result()?;

        let name = input.name.trim();
        let slug = next_unique_slug(name, HOUSEHOLD_SLUG_FALLBACK, |candidate| async move {
            self.households.slug_exists(&candidate).await
        })
        .await?;

        let household = self
            .households
            .create_with_owner(
                &NewHousehold {
                    name: name.to_owned(),
                    slug,
                    locale: locale.unwrap_or(DEFAULT_LOCALE).to_owned(),
                    currency: currency.unwrap_or(DEFAULT_CURRENCY).to_uppercase(),
                    new_members: true,
                },
                user_id,
            )
            .await?;
        tracing::info!(household_id = household.id.0, user_id, "household created");
        Ok(household)
    }
}

// ── ListMyHouseholds ─────────────────────────────────────────────────────────

pub struct ListMyHouseholdsUseCase<H: HouseholdRepository> {
    pub households: H,
}

impl<H: HouseholdRepository> ListMyHouseholdsUseCase<H> {
    pub async fn execute(&self, user_id: i64) -> Result<Vec<MyHousehold>, KitchenServiceError> {
        self.households.list_for_user(user_id).await
    }
}

// ── SetActiveHousehold ───────────────────────────────────────────────────────

pub struct SetActiveHouseholdUseCase<M: MembershipRepository> {
    pub memberships: M,
}

impl<M: MembershipRepository> SetActiveHouseholdUseCase<M> {
    pub async fn execute(
        &self,
        user_id: i64,
        household_id: i64,
    ) -> Result<HouseholdId, KitchenServiceError> {
        let household_id = HouseholdId::new(household_id)
            .ok_or_else(|| ValidationErrors::single("household_id", "household_id is invalid"))?;
        let approved = self
            .memberships
            .find(household_id, user_id)
            .await?
            .is_some_and(|m| m.is_approved());
        if !approved {
            return Err(KitchenServiceError::NotHouseholdMember);
        }
        Ok(household_id)
    }
}

// ── UpdateHousehold ──────────────────────────────────────────────────────────

pub struct UpdateHouseholdUseCase<H, M>
where
    H: HouseholdRepository,
    M: MembershipRepository,
{
    pub households: H,
    pub memberships: M,
}

impl<H, M> UpdateHouseholdUseCase<H, M>
where
    H: HouseholdRepository,
    M: MembershipRepository,
{
    pub async fn execute(
        &self,
        user_id: i64,
        household_id: HouseholdId,
        changes: HouseholdChanges,
    ) -> Result<Household, KitchenServiceError> {
        require_manager(&self.memberships, household_id, user_id).await?;

        let changes = HouseholdChanges {
            name: changes.name.map(|n| n.trim().to_owned()),
            locale: changes.locale.map(|l| l.trim().to_owned()),
            currency: changes.currency.map(|c| c.trim().to_uppercase()),
        };
        if changes.name.is_none() && changes.locale.is_none() && changes.currency.is_none() {
            return Err(KitchenServiceError::MissingData);
        }

        let mut errors = ValidationErrors::new();
        if let Some(name) = &changes.name {
            check_required(&mut errors, "name", name, 255);
        }
        if let Some(locale) = &changes.locale {
            check_required(&mut errors, "locale", locale, 12);
        }
        check_currency(&mut errors, changes.currency.as_deref());
        errors.into_result()?;

        self.households.update(household_id, &changes).await
    }
}

// ── DeleteHousehold ──────────────────────────────────────────────────────────

pub struct DeleteHouseholdUseCase<H, M>
where
    H: HouseholdRepository,
    M: MembershipRepository,
{
    pub households: H,
    pub memberships: M,
}

impl<H, M> DeleteHouseholdUseCase<H, M>
where
    H: HouseholdRepository,
    M: MembershipRepository,
{
    pub async fn execute(
        &self,
        user_id: i64,
        household_id: HouseholdId,
    ) -> Result<(), KitchenServiceError> {
        let membership = self
            .memberships
            .find(household_id, user_id)
            .await?
            .filter(|m| m.is_approved())
            .ok_or(KitchenServiceError::NotHouseholdMember)?;
        if membership.role != MembershipRole::Owner {
            return Err(KitchenServiceError::HouseholdOwnerOnly);
        }
        self.households.soft_delete(household_id).await?;
        tracing::info!(household_id = household_id.0, user_id, "household deleted");
        Ok(())
    }
}

// ── SetOpenMembership ────────────────────────────────────────────────────────

pub struct SetOpenMembershipUseCase<H, M>
where
    H: HouseholdRepository,
    M: MembershipRepository,
{
    pub households: H,
    pub memberships: M,
}

impl<H, M> SetOpenMembershipUseCase<H, M>
where
    H: HouseholdRepository,
    M: MembershipRepository,
{
    pub async fn execute(
        &self,
        user_id: i64,
        household_id: HouseholdId,
        open: bool,
    ) -> Result<Household, KitchenServiceError> {
        require_manager(&self.memberships, household_id, user_id).await?;
        self.households.set_new_members(household_id, open).await
    }
}

// ── HouseholdManagement ──────────────────────────────────────────────────────

#[derive(Debug)]
pub struct HouseholdManagement {
    pub household: Household,
    pub members: Vec<MemberView>,
    pub pending: Vec<MemberView>,
    pub invites: Vec<Invite>,
}

pub struct HouseholdManagementUseCase<H, M, I>
where
    H: HouseholdRepository,
    M: MembershipRepository,
    I: InviteRepository,
{
    pub households: H,
    pub memberships: M,
    pub invites: I,
}

impl<H, M, I> HouseholdManagementUseCase<H, M, I>
where
    H: HouseholdRepository,
    M: MembershipRepository,
    I: InviteRepository,
{
    pub async fn execute(
        &self,
        user_id: i64,
        household_id: HouseholdId,
    ) -> Result<HouseholdManagement, KitchenServiceError> {
        require_manager(&self.memberships, household_id, user_id).await?;
        let household = self
            .households
            .find_by_id(household_id)
            .await?
            .ok_or(KitchenServiceError::HouseholdNotFound)?;
        let members = self
            .memberships
            .list(household_id, MembershipStatus::Approved)
            .await?;
        let pending = self
            .memberships
            .list(household_id, MembershipStatus::Pending)
            .await?;
        let invites = self.invites.list_pending(household_id).await?;
        Ok(HouseholdManagement {
            household,
            members,
            pending,
            invites,
        })
    }
}
