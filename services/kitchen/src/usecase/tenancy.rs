use larder_domain::id::HouseholdId;
use larder_domain::tenancy::HouseholdContext;

use crate::domain::repository::MembershipRepository;
use crate::error::KitchenServiceError;

// ── ResolveHouseholdContext ──────────────────────────────────────────────────

/// Resolved context plus the household to remember in the session, if it changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextResolution {
    pub context: HouseholdContext,
    pub persist: Option<HouseholdId>,
}

pub struct ResolveHouseholdContextUseCase<M: MembershipRepository> {
    pub memberships: M,
}

impl<M: MembershipRepository> ResolveHouseholdContextUseCase<M> {
    /// `selector` is the raw request header, `session` the remembered household id.
    /// The selector wins over the session; whichever is used must name a household the
    /// user is an approved member of.
    pub async fn execute(
        &self,
        user_id: i64,
        selector: Option<&str>,
        session: Option<i64>,
    ) -> Result<ContextResolution, KitchenServiceError> {
        // A blank or zero selector means "no selection" and falls back to the session.
        let selector = selector
            .map(str::trim)
            .filter(|raw| !raw.is_empty() && *raw != "0");
        let selected = match selector {
            Some(raw) => Some(
                raw.parse::<HouseholdId>()
                    .map_err(|_| KitchenServiceError::InvalidHouseholdContext)?,
            ),
            None => None,
        };

        let Some(household_id) = selected.or(session.and_then(HouseholdId::new)) else {
            return Ok(ContextResolution {
                context: HouseholdContext::Unresolved,
                persist: None,
            });
        };

        let approved = self
            .memberships
            .find(household_id, user_id)
            .await?
            .is_some_and(|m| m.is_approved());
        if !approved {
            tracing::debug!(user_id, household_id = household_id.0, "household context rejected");
            return Err(KitchenServiceError::InvalidHouseholdContext);
        }

        let persist = (session != Some(household_id.0)).then_some(household_id);
        Ok(ContextResolution {
            context: HouseholdContext::Resolved(household_id),
            persist,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use larder_domain::household::{MembershipRole, MembershipStatus};

    use crate::domain::types::{MemberView, Membership};

    struct MockMemberships {
        rows: Vec<Membership>,
    }

    fn membership(household_id: i64, user_id: i64, status: MembershipStatus) -> Membership {
        Membership {
            id: household_id * 100 + user_id,
            household_id: HouseholdId(household_id),
            user_id,
            role: MembershipRole::Member,
            status,
            approved_at: None,
            approved_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    impl MembershipRepository for MockMemberships {
        async fn find(
            &self,
            household_id: HouseholdId,
            user_id: i64,
        ) -> Result<Option<Membership>, KitchenServiceError> {
            Ok(self
                .rows
                .iter()
                .find(|m| m.household_id == household_id && m.user_id == user_id)
                .cloned())
        }
        async fn find_by_id(&self, _id: i64) -> Result<Option<Membership>, KitchenServiceError> {
            Ok(None)
        }
        async fn list(
            &self,
            _household_id: HouseholdId,
            _status: MembershipStatus,
        ) -> Result<Vec<MemberView>, KitchenServiceError> {
            Ok(vec![])
        }
        async fn request_join(
            &self,
            _household_id: HouseholdId,
            _user_id: i64,
        ) -> Result<Membership, KitchenServiceError> {
            unimplemented!()
        }
        async fn review(
            &self,
            _id: i64,
            _status: MembershipStatus,
            _reviewer_id: i64,
            _at: DateTime<Utc>,
        ) -> Result<Membership, KitchenServiceError> {
            unimplemented!()
        }
        async fn delete(&self, _id: i64) -> Result<bool, KitchenServiceError> {
            Ok(false)
        }
    }

    fn usecase() -> ResolveHouseholdContextUseCase<MockMemberships> {
        ResolveHouseholdContextUseCase {
            memberships: MockMemberships {
                rows: vec![
                    membership(1, 7, MembershipStatus::Approved),
                    membership(2, 7, MembershipStatus::Approved),
                    membership(3, 7, MembershipStatus::Pending),
                ],
            },
        }
    }

    #[tokio::test]
    async fn should_stay_unresolved_without_selector_or_session() {
        let res = usecase().execute(7, None, None).await.unwrap();
        assert_eq!(res.context, HouseholdContext::Unresolved);
        assert_eq!(res.persist, None);
    }

    #[tokio::test]
    async fn should_prefer_selector_over_session_and_persist_it() {
        let res = usecase().execute(7, Some("2"), Some(1)).await.unwrap();
        assert_eq!(res.context, HouseholdContext::Resolved(HouseholdId(2)));
        assert_eq!(res.persist, Some(HouseholdId(2)));
    }

    #[tokio::test]
    async fn should_not_persist_unchanged_session() {
        let res = usecase().execute(7, None, Some(1)).await.unwrap();
        assert_eq!(res.context, HouseholdContext::Resolved(HouseholdId(1)));
        assert_eq!(res.persist, None);

        let res = usecase().execute(7, Some("1"), Some(1)).await.unwrap();
        assert_eq!(res.persist, None);
    }

    #[tokio::test]
    async fn should_reject_malformed_selector() {
        for raw in ["abc", "-4", "1.5"] {
            let result = usecase().execute(7, Some(raw), Some(1)).await;
            assert!(
                matches!(result, Err(KitchenServiceError::InvalidHouseholdContext)),
                "selector {raw:?}"
            );
        }
    }

    #[tokio::test]
    async fn should_fall_back_to_session_for_blank_selector() {
        for raw in ["", "  ", "0"] {
            let res = usecase().execute(7, Some(raw), Some(1)).await.unwrap();
            assert_eq!(
                res.context,
                HouseholdContext::Resolved(HouseholdId(1)),
                "selector {raw:?}"
            );
            assert_eq!(res.persist, None);
        }
        let res = usecase().execute(7, Some(""), None).await.unwrap();
        assert_eq!(res.context, HouseholdContext::Unresolved);
    }

    #[tokio::test]
    async fn should_reject_households_without_approved_membership() {
        let pending = usecase().execute(7, Some("3"), None).await;
        assert!(matches!(
            pending,
            Err(KitchenServiceError::InvalidHouseholdContext)
        ));
        let stranger = usecase().execute(8, None, Some(1)).await;
        assert!(matches!(
            stranger,
            Err(KitchenServiceError::InvalidHouseholdContext)
        ));
    }

    #[tokio::test]
    async fn should_ignore_non_positive_session_value() {
        let res = usecase().execute(7, None, Some(0)).await.unwrap();
        assert_eq!(res.context, HouseholdContext::Unresolved);
    }
}
