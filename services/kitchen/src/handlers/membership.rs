use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use larder_auth_types::identity::IdentityHeaders;
use larder_domain::household::{MembershipRole, MembershipStatus, Review};
use larder_domain::id::HouseholdId;

use crate::domain::types::{MemberView, Membership};
use crate::error::KitchenServiceError;
use crate::handlers::household::household_id;
use crate::state::AppState;
use crate::usecase::membership::{
    JoinOutcome, ListJoinRequestsUseCase, RemoveMemberUseCase, RequestJoinUseCase,
    ReviewMembershipUseCase,
};

#[derive(Serialize)]
pub struct MembershipResponse {
    pub id: i64,
    pub household_id: HouseholdId,
    pub user_id: i64,
    pub role: MembershipRole,
    pub status: MembershipStatus,
    #[serde(serialize_with = "larder_core::serde::to_rfc3339_ms_opt")]
    pub approved_at: Option<chrono::DateTime<chrono::Utc>>,
    pub approved_by: Option<i64>,
    #[serde(serialize_with = "larder_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Membership> for MembershipResponse {
    fn from(m: Membership) -> Self {
        Self {
            id: m.id,
            household_id: m.household_id,
            user_id: m.user_id,
            role: m.role,
            status: m.status,
            approved_at: m.approved_at,
            approved_by: m.approved_by,
            created_at: m.created_at,
        }
    }
}

/// Membership joined with the member's name and email.
#[derive(Serialize)]
pub struct MemberResponse {
    #[serde(flatten)]
    pub membership: MembershipResponse,
    pub name: String,
    pub email: String,
}

impl From<MemberView> for MemberResponse {
    fn from(view: MemberView) -> Self {
        Self {
            membership: view.membership.into(),
            name: view.name,
            email: view.email,
        }
    }
}

// ── POST /households/join-requests ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct JoinRequest {
    #[serde(default)]
    pub slug: String,
}

#[derive(Serialize)]
pub struct AlreadyMemberResponse {
    pub message: &'static str,
}

pub async fn request_join(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<JoinRequest>,
) -> Result<Response, KitchenServiceError> {
    let usecase = RequestJoinUseCase {
        households: state.household_repo(),
        memberships: state.membership_repo(),
    };
    let response = match usecase.execute(identity.user_id, &body.slug).await? {
        JoinOutcome::AlreadyMember => (
            StatusCode::OK,
            Json(AlreadyMemberResponse {
                message: "already a member",
            }),
        )
            .into_response(),
        JoinOutcome::Requested(membership) => (
            StatusCode::ACCEPTED,
            Json(MembershipResponse::from(membership)),
        )
            .into_response(),
    };
    Ok(response)
}

// ── GET /households/{id}/join-requests ───────────────────────────────────────

pub async fn list_join_requests(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<MemberResponse>>, KitchenServiceError> {
    let usecase = ListJoinRequestsUseCase {
        memberships: state.membership_repo(),
    };
    let pending = usecase.execute(identity.user_id, household_id(id)?).await?;
    Ok(Json(pending.into_iter().map(Into::into).collect()))
}

// ── POST /household-memberships/{id}/approve | reject ────────────────────────

async fn review(
    identity: IdentityHeaders,
    state: AppState,
    membership_id: i64,
    decision: Review,
) -> Result<Json<MembershipResponse>, KitchenServiceError> {
    let usecase = ReviewMembershipUseCase {
        memberships: state.membership_repo(),
    };
    let membership = usecase
        .execute(identity.user_id, membership_id, decision)
        .await?;
    Ok(Json(membership.into()))
}

pub async fn approve_membership(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MembershipResponse>, KitchenServiceError> {
    review(identity, state, id, Review::Approve).await
}

pub async fn reject_membership(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MembershipResponse>, KitchenServiceError> {
    review(identity, state, id, Review::Reject).await
}

// ── DELETE /household-memberships/{id} ───────────────────────────────────────

pub async fn remove_member(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, KitchenServiceError> {
    let usecase = RemoveMemberUseCase {
        memberships: state.membership_repo(),
    };
    usecase.execute(identity.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
