//! In-memory user, household, membership and invite repositories for use case tests.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use larder_domain::household::{InviteStatus, MembershipRole, MembershipStatus};
use larder_domain::id::HouseholdId;

use crate::domain::repository::{
    HouseholdRepository, InviteRepository, MembershipRepository, UserRepository,
};
use crate::domain::types::{
    Household, HouseholdChanges, Invite, MemberView, Membership, MyHousehold, NewHousehold,
    NewInvite, NewUser, OutboxEvent, User,
};
use crate::error::KitchenServiceError;

#[derive(Default)]
pub struct Store {
    pub users: Vec<User>,
    pub households: Vec<(Household, bool)>,
    pub memberships: Vec<Membership>,
    pub invites: Vec<Invite>,
    pub outbox: Vec<OutboxEvent>,
    next_id: i64,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn live_household(&self, id: HouseholdId) -> Option<&Household> {
        self.households
            .iter()
            .find(|(h, deleted)| h.id == id && !deleted)
            .map(|(h, _)| h)
    }
}

#[derive(Clone, Default)]
pub struct FakeRepo {
    pub store: Arc<Mutex<Store>>,
}

impl FakeRepo {
    pub fn add_user(&self, name: &str, email: &str) -> i64 {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        store.users.push(User {
            id,
            name: name.to_owned(),
            email: email.to_owned(),
            role: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        id
    }

    pub fn add_household(&self, name: &str, slug: &str, new_members: bool) -> HouseholdId {
        let mut store = self.store.lock().unwrap();
        let id = HouseholdId(store.next_id());
        store.households.push((
            Household {
                id,
                name: name.to_owned(),
                slug: slug.to_owned(),
                locale: "en".into(),
                currency: "GBP".into(),
                new_members,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            false,
        ));
        id
    }

    pub fn add_membership(
        &self,
        household_id: HouseholdId,
        user_id: i64,
        role: MembershipRole,
        status: MembershipStatus,
    ) -> i64 {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        store.memberships.push(Membership {
            id,
            household_id,
            user_id,
            role,
            status,
            approved_at: None,
            approved_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        id
    }

    pub fn add_invite(
        &self,
        household_id: HouseholdId,
        invited_by: i64,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> i64 {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        store.invites.push(Invite {
            id,
            household_id,
            invited_by,
            name: None,
            email: email.to_owned(),
            token: token.to_owned(),
            status: InviteStatus::Pending,
            accepted_at: None,
            expires_at,
            created_at: Utc::now(),
        });
        id
    }

    pub fn membership_of(&self, household_id: HouseholdId, user_id: i64) -> Option<Membership> {
        self.store
            .lock()
            .unwrap()
            .memberships
            .iter()
            .find(|m| m.household_id == household_id && m.user_id == user_id)
            .cloned()
    }

    pub fn invite(&self, id: i64) -> Option<Invite> {
        self.store
            .lock()
            .unwrap()
            .invites
            .iter()
            .find(|i| i.id == id)
            .cloned()
    }

    pub fn is_deleted(&self, id: HouseholdId) -> bool {
        self.store
            .lock()
            .unwrap()
            .households
            .iter()
            .any(|(h, deleted)| h.id == id && *deleted)
    }
}

impl UserRepository for FakeRepo {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, KitchenServiceError> {
        let store = self.store.lock().unwrap();
        Ok(store.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, KitchenServiceError> {
        let store = self.store.lock().unwrap();
        Ok(store.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: &NewUser) -> Result<User, KitchenServiceError> {
        let id = self.add_user(&user.name, &user.email);
        let store = self.store.lock().unwrap();
        Ok(store.users.iter().find(|u| u.id == id).cloned().unwrap())
    }
}

impl HouseholdRepository for FakeRepo {
    async fn find_by_id(&self, id: HouseholdId) -> Result<Option<Household>, KitchenServiceError> {
        Ok(self.store.lock().unwrap().live_household(id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Household>, KitchenServiceError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .households
            .iter()
            .find(|(h, deleted)| h.slug == slug && !deleted)
            .map(|(h, _)| h.clone()))
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, KitchenServiceError> {
        let store = self.store.lock().unwrap();
        Ok(store.households.iter().any(|(h, _)| h.slug == slug))
    }

    async fn create_with_owner(
        &self,
        household: &NewHousehold,
        owner_id: i64,
    ) -> Result<Household, KitchenServiceError> {
        let id = self.add_household(&household.name, &household.slug, household.new_members);
        self.add_membership(id, owner_id, MembershipRole::Owner, MembershipStatus::Approved);
        let mut store = self.store.lock().unwrap();
        let (row, _) = store
            .households
            .iter_mut()
            .find(|(h, _)| h.id == id)
            .unwrap();
        row.locale = household.locale.clone();
        row.currency = household.currency.clone();
        Ok(row.clone())
    }

    async fn update(
        &self,
        id: HouseholdId,
        changes: &HouseholdChanges,
    ) -> Result<Household, KitchenServiceError> {
        let mut store = self.store.lock().unwrap();
        let (row, _) = store
            .households
            .iter_mut()
            .find(|(h, _)| h.id == id)
            .ok_or(KitchenServiceError::HouseholdNotFound)?;
        if let Some(name) = &changes.name {
            row.name = name.clone();
        }
        if let Some(locale) = &changes.locale {
            row.locale = locale.clone();
        }
        if let Some(currency) = &changes.currency {
            row.currency = currency.clone();
        }
        Ok(row.clone())
    }

    async fn set_new_members(
        &self,
        id: HouseholdId,
        open: bool,
    ) -> Result<Household, KitchenServiceError> {
        let mut store = self.store.lock().unwrap();
        let (row, _) = store
            .households
            .iter_mut()
            .find(|(h, _)| h.id == id)
            .ok_or(KitchenServiceError::HouseholdNotFound)?;
        row.new_members = open;
        Ok(row.clone())
    }

    async fn soft_delete(&self, id: HouseholdId) -> Result<(), KitchenServiceError> {
        let mut store = self.store.lock().unwrap();
        for (h, deleted) in store.households.iter_mut() {
            if h.id == id {
                *deleted = true;
            }
        }
        Ok(())
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<MyHousehold>, KitchenServiceError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .memberships
            .iter()
            .filter(|m| m.user_id == user_id && m.is_approved())
            .filter_map(|m| {
                store.live_household(m.household_id).map(|h| MyHousehold {
                    household: h.clone(),
                    role: m.role,
                })
            })
            .collect())
    }
}

impl MembershipRepository for FakeRepo {
    async fn find(
        &self,
        household_id: HouseholdId,
        user_id: i64,
    ) -> Result<Option<Membership>, KitchenServiceError> {
        let store = self.store.lock().unwrap();
        if store.live_household(household_id).is_none() {
            return Ok(None);
        }
        Ok(store
            .memberships
            .iter()
            .find(|m| m.household_id == household_id && m.user_id == user_id)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Membership>, KitchenServiceError> {
        let store = self.store.lock().unwrap();
        Ok(store.memberships.iter().find(|m| m.id == id).cloned())
    }

    async fn list(
        &self,
        household_id: HouseholdId,
        status: MembershipStatus,
    ) -> Result<Vec<MemberView>, KitchenServiceError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .memberships
            .iter()
            .filter(|m| m.household_id == household_id && m.status == status)
            .map(|m| {
                let user = store.users.iter().find(|u| u.id == m.user_id);
                MemberView {
                    membership: m.clone(),
                    name: user.map(|u| u.name.clone()).unwrap_or_default(),
                    email: user.map(|u| u.email.clone()).unwrap_or_default(),
                }
            })
            .collect())
    }

    async fn request_join(
        &self,
        household_id: HouseholdId,
        user_id: i64,
    ) -> Result<Membership, KitchenServiceError> {
        if self.membership_of(household_id, user_id).is_none() {
            self.add_membership(
                household_id,
                user_id,
                MembershipRole::Member,
                MembershipStatus::Pending,
            );
        }
        let mut store = self.store.lock().unwrap();
        let row = store
            .memberships
            .iter_mut()
            .find(|m| m.household_id == household_id && m.user_id == user_id)
            .unwrap();
        row.role = MembershipRole::Member;
        row.status = MembershipStatus::Pending;
        row.approved_at = None;
        row.approved_by = None;
        Ok(row.clone())
    }

    async fn review(
        &self,
        id: i64,
        status: MembershipStatus,
        reviewer_id: i64,
        at: DateTime<Utc>,
    ) -> Result<Membership, KitchenServiceError> {
        let mut store = self.store.lock().unwrap();
        let row = store
            .memberships
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(KitchenServiceError::MembershipNotFound)?;
        if row.status != MembershipStatus::Pending {
            return Err(KitchenServiceError::MembershipNotPending);
        }
        row.status = status;
        row.approved_by = Some(reviewer_id);
        row.approved_at = (status == MembershipStatus::Approved).then_some(at);
        Ok(row.clone())
    }

    async fn delete(&self, id: i64) -> Result<bool, KitchenServiceError> {
        let mut store = self.store.lock().unwrap();
        let before = store.memberships.len();
        store.memberships.retain(|m| m.id != id);
        Ok(store.memberships.len() < before)
    }
}

impl InviteRepository for FakeRepo {
    async fn find_by_id(&self, id: i64) -> Result<Option<Invite>, KitchenServiceError> {
        Ok(self.invite(id))
    }

    async fn find_pending_by_token(
        &self,
        token: &str,
    ) -> Result<Option<Invite>, KitchenServiceError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .invites
            .iter()
            .find(|i| i.token == token && i.status == InviteStatus::Pending)
            .cloned())
    }

    async fn list_pending(
        &self,
        household_id: HouseholdId,
    ) -> Result<Vec<Invite>, KitchenServiceError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .invites
            .iter()
            .filter(|i| i.household_id == household_id && i.status == InviteStatus::Pending)
            .cloned()
            .collect())
    }

    async fn create_with_outbox(
        &self,
        invite: &NewInvite,
        event: &OutboxEvent,
    ) -> Result<Invite, KitchenServiceError> {
        let id = self.add_invite(
            invite.household_id,
            invite.invited_by,
            &invite.email,
            &invite.token,
            invite.expires_at,
        );
        let mut store = self.store.lock().unwrap();
        store.outbox.push(event.clone());
        let row = store.invites.iter_mut().find(|i| i.id == id).unwrap();
        row.name = invite.name.clone();
        Ok(row.clone())
    }

    async fn redeem(
        &self,
        invite: &Invite,
        user_id: i64,
        at: DateTime<Utc>,
    ) -> Result<Membership, KitchenServiceError> {
        if self.membership_of(invite.household_id, user_id).is_none() {
            self.add_membership(
                invite.household_id,
                user_id,
                MembershipRole::Member,
                MembershipStatus::Approved,
            );
        }
        let mut store = self.store.lock().unwrap();
        let pending = store
            .invites
            .iter_mut()
            .find(|i| i.id == invite.id && i.status == InviteStatus::Pending)
            .ok_or(KitchenServiceError::InviteNotFound)?;
        pending.status = InviteStatus::Accepted;
        pending.accepted_at = Some(at);
        let row = store
            .memberships
            .iter_mut()
            .find(|m| m.household_id == invite.household_id && m.user_id == user_id)
            .unwrap();
        if !(row.is_approved() && row.role.can_manage()) {
            row.role = MembershipRole::Member;
        }
        row.status = MembershipStatus::Approved;
        row.approved_at = Some(at);
        row.approved_by = Some(invite.invited_by);
        Ok(row.clone())
    }

    async fn revoke(&self, id: i64) -> Result<Option<Invite>, KitchenServiceError> {
        let mut store = self.store.lock().unwrap();
        Ok(store
            .invites
            .iter_mut()
            .find(|i| i.id == id && i.status == InviteStatus::Pending)
            .map(|i| {
                i.status = InviteStatus::Revoked;
                i.clone()
            }))
    }
}
