use chrono::{Duration, Utc};
use rand::RngExt;
use serde_json::json;
use uuid::Uuid;

use larder_domain::id::HouseholdId;

use crate::domain::repository::{
    HouseholdRepository, InviteRepository, MembershipRepository, UserRepository,
};
use crate::domain::types::{
    INVITE_CREATED_EVENT, INVITE_TOKEN_LEN, Invite, NewInvite, OutboxEvent, invite_path,
};
use crate::domain::validation::{ValidationErrors, check_max_len, is_email, non_blank};
use crate::error::KitchenServiceError;
use crate::usecase::membership::require_manager;

/// Charset for invite tokens (mixed-case alphanumeric).
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Shortest token worth looking up.
const MIN_TOKEN_LEN: usize = 20;

fn generate_token() -> String {
    let mut rng = rand::rng();
    (0..INVITE_TOKEN_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

// ── SendInvite ───────────────────────────────────────────────────────────────

pub struct SendInviteInput {
    pub email: String,
    pub name: Option<String>,
}

pub struct SendInviteUseCase<U, H, M, I>
where
    U: UserRepository,
    H: HouseholdRepository,
    M: MembershipRepository,
    I: InviteRepository,
{
    pub users: U,
    pub households: H,
    pub memberships: M,
    pub invites: I,
    pub ttl_days: i64,
}

impl<U, H, M, I> SendInviteUseCase<U, H, M, I>
where
    U: UserRepository,
    H: HouseholdRepository,
    M: MembershipRepository,
    I: InviteRepository,
{
    pub async fn execute(
        &self,
        user_id: i64,
        household_id: HouseholdId,
        input: SendInviteInput,
    ) -> Result<Invite, KitchenServiceError> {
        require_manager(&self.memberships, household_id, user_id).await?;

        let email = input.email.trim().to_lowercase();
        let name = non_blank(input.name.as_deref()).map(str::to_owned);
        let mut errors = ValidationErrors::new();
        if email.is_empty() {
            errors.add("email", "email is required");
        } else if !is_email(&email) {
            errors.add("email", "email must be a valid email address");
        }
        check_max_len(&mut errors, "name", name.as_deref(), 255);
        errors.into_result()?;

        let household = self
            .households
            .find_by_id(household_id)
            .await?
            .ok_or(KitchenServiceError::HouseholdNotFound)?;

        // 1. Refuse invites for people who are already in
        let invitee = self.users.find_by_email(&email).await?;
        if let Some(invitee) = &invitee {
            let member = self
                .memberships
                .find(household_id, invitee.id)
                .await?
                .is_some_and(|m| m.is_approved());
            if member {
                return Err(KitchenServiceError::AlreadyMember);
            }
        }

        // 2. Build invite + outbox event
        let token = generate_token();
        let expires_at = Utc::now() + Duration::days(self.ttl_days);
        let invite = NewInvite {
            household_id,
            invited_by: user_id,
            name: name.clone(),
            email: email.clone(),
            token: token.clone(),
            expires_at,
        };
        let event = OutboxEvent {
            id: Uuid::new_v4(),
            kind: INVITE_CREATED_EVENT.to_owned(),
            payload: json!({
                "household_id": household.id,
                "household_name": household.name,
                "email": email,
                "name": name,
                "path": invite_path(&token, invitee.is_some()),
                "expires_at": expires_at.to_rfc3339(),
            }),
            idempotency_key: format!("{INVITE_CREATED_EVENT}:{token}"),
        };

        // 3. Write both in one transaction
        let invite = self.invites.create_with_outbox(&invite, &event).await?;
        tracing::info!(household_id = household_id.0, invite_id = invite.id, "invite created");
        Ok(invite)
    }
}

// ── RedeemInvite ─────────────────────────────────────────────────────────────

pub struct RedeemInviteUseCase<U, I>
where
    U: UserRepository,
    I: InviteRepository,
{
    pub users: U,
    pub invites: I,
}

impl<U, I> RedeemInviteUseCase<U, I>
where
    U: UserRepository,
    I: InviteRepository,
{
    /// Returns the household the caller just joined.
    pub async fn execute(
        &self,
        user_id: i64,
        token: &str,
    ) -> Result<HouseholdId, KitchenServiceError> {
        let token = token.trim();
        if token.chars().count() < MIN_TOKEN_LEN {
            return Err(ValidationErrors::single(
                "token",
                format!("token must be at least {MIN_TOKEN_LEN} characters"),
            ));
        }

        let invite = self
            .invites
            .find_pending_by_token(token)
            .await?
            .ok_or(KitchenServiceError::InviteNotFound)?;

        let now = Utc::now();
        if invite.is_expired(now) {
            return Err(KitchenServiceError::InviteExpired);
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(KitchenServiceError::UserNotFound)?;
        if user.email.to_lowercase() != invite.email.to_lowercase() {
            return Err(KitchenServiceError::InviteEmailMismatch);
        }

        self.invites.redeem(&invite, user_id, now).await?;
        tracing::info!(
            household_id = invite.household_id.0,
            invite_id = invite.id,
            user_id,
            "invite redeemed"
        );
        Ok(invite.household_id)
    }
}

// ── RevokeInvite ─────────────────────────────────────────────────────────────

pub struct RevokeInviteUseCase<M, I>
where
    M: MembershipRepository,
    I: InviteRepository,
{
    pub memberships: M,
    pub invites: I,
}

impl<M, I> RevokeInviteUseCase<M, I>
where
    M: MembershipRepository,
    I: InviteRepository,
{
    pub async fn execute(
        &self,
        user_id: i64,
        invite_id: i64,
    ) -> Result<Invite, KitchenServiceError> {
        let invite = self
            .invites
            .find_by_id(invite_id)
            .await?
            .ok_or(KitchenServiceError::InviteNotFound)?;
        require_manager(&self.memberships, invite.household_id, user_id).await?;
        self.invites
            .revoke(invite_id)
            .await?
            .ok_or(KitchenServiceError::InviteNotFound)
    }
}
