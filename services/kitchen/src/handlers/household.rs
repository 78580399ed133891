use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use larder_auth_types::identity::IdentityHeaders;
use larder_auth_types::session::{
    active_household, clear_active_household_cookie, set_active_household_cookie,
};
use larder_domain::household::MembershipRole;
use larder_domain::id::HouseholdId;

use crate::domain::types::{Household, HouseholdChanges};
use crate::error::KitchenServiceError;
use crate::handlers::invite::InviteResponse;
use crate::handlers::membership::MemberResponse;
use crate::state::AppState;
use crate::usecase::household::{
    CreateHouseholdInput, CreateHouseholdUseCase, DeleteHouseholdUseCase,
    HouseholdManagementUseCase, ListMyHouseholdsUseCase, SetActiveHouseholdUseCase,
    SetOpenMembershipUseCase, UpdateHouseholdUseCase,
};

/// Household id from a path segment. Ids that cannot exist read as not found.
pub(crate) fn household_id(raw: i64) -> Result<HouseholdId, KitchenServiceError> {
    HouseholdId::new(raw).ok_or(KitchenServiceError::HouseholdNotFound)
}

#[derive(Serialize)]
pub struct HouseholdResponse {
    pub id: HouseholdId,
    pub name: String,
    pub slug: String,
    pub locale: String,
    pub currency: String,
    pub new_members: bool,
    #[serde(serialize_with = "larder_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "larder_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Household> for HouseholdResponse {
    fn from(household: Household) -> Self {
        Self {
            id: household.id,
            name: household.name,
            slug: household.slug,
            locale: household.locale,
            currency: household.currency,
            new_members: household.new_members,
            created_at: household.created_at,
            updated_at: household.updated_at,
        }
    }
}

// ── GET /households/my ───────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct MyHouseholdResponse {
    #[serde(flatten)]
    pub household: HouseholdResponse,
    pub role: MembershipRole,
}

#[derive(Serialize)]
pub struct MyHouseholdsResponse {
    pub households: Vec<MyHouseholdResponse>,
    pub active_household_id: Option<HouseholdId>,
}

pub async fn get_my_households(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<MyHouseholdsResponse>, KitchenServiceError> {
    let usecase = ListMyHouseholdsUseCase {
        households: state.household_repo(),
    };
    let households = usecase.execute(identity.user_id).await?;

    // A remembered household the user no longer belongs to is not reported as active.
    let active_household_id = active_household(&jar)
        .map(HouseholdId)
        .filter(|id| households.iter().any(|h| h.household.id == *id));

    Ok(Json(MyHouseholdsResponse {
        households: households
            .into_iter()
            .map(|h| MyHouseholdResponse {
                household: h.household.into(),
                role: h.role,
            })
            .collect(),
        active_household_id,
    }))
}

// ── POST /households ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateHouseholdRequest {
    #[serde(default)]
    pub name: String,
    pub locale: Option<String>,
    pub currency: Option<String>,
}

pub async fn create_household(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<CreateHouseholdRequest>,
) -> Result<(StatusCode, CookieJar, Json<HouseholdResponse>), KitchenServiceError> {
    let usecase = CreateHouseholdUseCase {
        households: state.household_repo(),
    };
    let household = usecase
        .execute(
            identity.user_id,
            CreateHouseholdInput {
                name: body.name,
                locale: body.locale,
                currency: body.currency,
            },
        )
        .await?;
    let jar = set_active_household_cookie(jar, household.id.0, state.cookie_domain.clone());
    Ok((StatusCode::CREATED, jar, Json(household.into())))
}

// ── POST /households/active ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SetActiveHouseholdRequest {
    pub household_id: i64,
}

#[derive(Serialize)]
pub struct ActiveHouseholdResponse {
    pub active_household_id: HouseholdId,
}

pub async fn set_active_household(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<SetActiveHouseholdRequest>,
) -> Result<(CookieJar, Json<ActiveHouseholdResponse>), KitchenServiceError> {
    let usecase = SetActiveHouseholdUseCase {
        memberships: state.membership_repo(),
    };
    let household_id = usecase
        .execute(identity.user_id, body.household_id)
        .await?;
    let jar = set_active_household_cookie(jar, household_id.0, state.cookie_domain.clone());
    Ok((
        jar,
        Json(ActiveHouseholdResponse {
            active_household_id: household_id,
        }),
    ))
}

// ── PATCH /households/{id} ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateHouseholdRequest {
    pub name: Option<String>,
    pub locale: Option<String>,
    pub currency: Option<String>,
}

pub async fn update_household(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateHouseholdRequest>,
) -> Result<Json<HouseholdResponse>, KitchenServiceError> {
    let usecase = UpdateHouseholdUseCase {
        households: state.household_repo(),
        memberships: state.membership_repo(),
    };
    let household = usecase
        .execute(
            identity.user_id,
            household_id(id)?,
            HouseholdChanges {
                name: body.name,
                locale: body.locale,
                currency: body.currency,
            },
        )
        .await?;
    Ok(Json(household.into()))
}

// ── DELETE /households/{id} ──────────────────────────────────────────────────

pub async fn delete_household(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<(StatusCode, CookieJar), KitchenServiceError> {
    let household_id = household_id(id)?;
    let usecase = DeleteHouseholdUseCase {
        households: state.household_repo(),
        memberships: state.membership_repo(),
    };
    usecase.execute(identity.user_id, household_id).await?;

    let jar = if active_household(&jar) == Some(household_id.0) {
        clear_active_household_cookie(jar, state.cookie_domain.clone())
    } else {
        jar
    };
    Ok((StatusCode::NO_CONTENT, jar))
}

// ── PATCH /households/{id}/open-membership ───────────────────────────────────

#[derive(Deserialize)]
pub struct OpenMembershipRequest {
    pub new_members: bool,
}

pub async fn set_open_membership(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<OpenMembershipRequest>,
) -> Result<Json<HouseholdResponse>, KitchenServiceError> {
    let usecase = SetOpenMembershipUseCase {
        households: state.household_repo(),
        memberships: state.membership_repo(),
    };
    let household = usecase
        .execute(identity.user_id, household_id(id)?, body.new_members)
        .await?;
    Ok(Json(household.into()))
}

// ── GET /households/{id}/management ──────────────────────────────────────────

#[derive(Serialize)]
pub struct ManagementResponse {
    pub household: HouseholdResponse,
    pub members: Vec<MemberResponse>,
    pub pending: Vec<MemberResponse>,
    pub invites: Vec<InviteResponse>,
}

pub async fn get_management(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ManagementResponse>, KitchenServiceError> {
    let usecase = HouseholdManagementUseCase {
        households: state.household_repo(),
        memberships: state.membership_repo(),
        invites: state.invite_repo(),
    };
    let management = usecase.execute(identity.user_id, household_id(id)?).await?;
    Ok(Json(ManagementResponse {
        household: management.household.into(),
        members: management.members.into_iter().map(Into::into).collect(),
        pending: management.pending.into_iter().map(Into::into).collect(),
        invites: management.invites.into_iter().map(Into::into).collect(),
    }))
}
