use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use larder_auth_types::identity::IdentityHeaders;
use larder_auth_types::session::set_active_household_cookie;
use larder_domain::household::InviteStatus;
use larder_domain::id::HouseholdId;

use crate::domain::types::Invite;
use crate::error::KitchenServiceError;
use crate::handlers::household::household_id;
use crate::state::AppState;
use crate::usecase::invite::{
    RedeemInviteUseCase, RevokeInviteUseCase, SendInviteInput, SendInviteUseCase,
};

/// Invite as shown to household managers. The token only travels by email.
#[derive(Serialize)]
pub struct InviteResponse {
    pub id: i64,
    pub household_id: HouseholdId,
    pub invited_by: i64,
    pub name: Option<String>,
    pub email: String,
    pub status: InviteStatus,
    #[serde(serialize_with = "larder_core::serde::to_rfc3339_ms_opt")]
    pub accepted_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(serialize_with = "larder_core::serde::to_rfc3339_ms")]
    pub expires_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "larder_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Invite> for InviteResponse {
    fn from(invite: Invite) -> Self {
        Self {
            id: invite.id,
            household_id: invite.household_id,
            invited_by: invite.invited_by,
            name: invite.name,
            email: invite.email,
            status: invite.status,
            accepted_at: invite.accepted_at,
            expires_at: invite.expires_at,
            created_at: invite.created_at,
        }
    }
}

// ── POST /households/{id}/accesses ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct SendInviteRequest {
    #[serde(default)]
    pub email: String,
    pub name: Option<String>,
}

pub async fn send_invite(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<SendInviteRequest>,
) -> Result<(StatusCode, Json<InviteResponse>), KitchenServiceError> {
    let usecase = SendInviteUseCase {
        users: state.user_repo(),
        households: state.household_repo(),
        memberships: state.membership_repo(),
        invites: state.invite_repo(),
        ttl_days: state.invite_ttl_days,
    };
    let invite = usecase
        .execute(
            identity.user_id,
            household_id(id)?,
            SendInviteInput {
                email: body.email,
                name: body.name,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(invite.into())))
}

// ── DELETE /household-accesses/{id} ──────────────────────────────────────────

pub async fn revoke_invite(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<InviteResponse>, KitchenServiceError> {
    let usecase = RevokeInviteUseCase {
        memberships: state.membership_repo(),
        invites: state.invite_repo(),
    };
    let invite = usecase.execute(identity.user_id, id).await?;
    Ok(Json(invite.into()))
}

// ── POST /household-access/redeem ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RedeemInviteRequest {
    #[serde(default)]
    pub token: String,
}

#[derive(Serialize)]
pub struct RedeemInviteResponse {
    pub household_id: HouseholdId,
}

pub async fn redeem_invite(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RedeemInviteRequest>,
) -> Result<(CookieJar, Json<RedeemInviteResponse>), KitchenServiceError> {
    let usecase = RedeemInviteUseCase {
        users: state.user_repo(),
        invites: state.invite_repo(),
    };
    let household_id = usecase.execute(identity.user_id, &body.token).await?;
    let jar = set_active_household_cookie(jar, household_id.0, state.cookie_domain.clone());
    Ok((jar, Json(RedeemInviteResponse { household_id })))
}
