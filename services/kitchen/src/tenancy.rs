//! Per-request household context.
//!
//! `resolve_household_context` runs in front of tenant-owned routes, validates the
//! selected household against the caller's memberships and stores the outcome in the
//! request extensions. Handlers read it back through [`Tenancy`] or [`RequireHousehold`].

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;

use larder_auth_types::identity::IdentityHeaders;
use larder_auth_types::session::{
    HOUSEHOLD_SELECTOR_HEADER, active_household, set_active_household_cookie,
};
use larder_domain::id::HouseholdId;
use larder_domain::tenancy::HouseholdContext;

use crate::error::KitchenServiceError;
use crate::state::AppState;
use crate::usecase::tenancy::ResolveHouseholdContextUseCase;

pub async fn resolve_household_context(
    State(state): State<AppState>,
    identity: IdentityHeaders,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<(CookieJar, Response), KitchenServiceError> {
    let selector = match request.headers().get(HOUSEHOLD_SELECTOR_HEADER) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| KitchenServiceError::InvalidHouseholdContext)?
                .to_owned(),
        ),
        None => None,
    };

    let usecase = ResolveHouseholdContextUseCase {
        memberships: state.membership_repo(),
    };
    let resolution = usecase
        .execute(identity.user_id, selector.as_deref(), active_household(&jar))
        .await?;

    let jar = match resolution.persist {
        Some(household_id) => {
            set_active_household_cookie(jar, household_id.0, state.cookie_domain.clone())
        }
        None => jar,
    };

    request.extensions_mut().insert(resolution.context);
    let response = next.run(request).await;
    Ok((jar, response))
}

/// Household context of the current request. `Unresolved` when the middleware did not run
/// or the caller picked no household.
#[derive(Debug, Clone, Copy)]
pub struct Tenancy(pub HouseholdContext);

impl Tenancy {
    pub fn tenant(&self) -> Option<HouseholdId> {
        self.0.current_household_id()
    }
}

impl<S> FromRequestParts<S> for Tenancy
where
    S: Send + Sync,
{
    type Rejection = KitchenServiceError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let context = parts
            .extensions
            .get::<HouseholdContext>()
            .copied()
            .unwrap_or_default();
        std::future::ready(Ok(Self(context)))
    }
}

/// Guard for routes that only make sense inside a household.
#[derive(Debug, Clone, Copy)]
pub struct RequireHousehold(pub HouseholdId);

impl<S> FromRequestParts<S> for RequireHousehold
where
    S: Send + Sync,
{
    type Rejection = KitchenServiceError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let household_id = parts
            .extensions
            .get::<HouseholdContext>()
            .and_then(HouseholdContext::current_household_id);
        std::future::ready(
            household_id
                .map(Self)
                .ok_or(KitchenServiceError::HouseholdRequired),
        )
    }
}
