use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, IntoActiveModel as _, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, TransactionError, TransactionTrait, sea_query::Expr, sea_query::OnConflict,
};

use larder_domain::household::{InviteStatus, MembershipRole, MembershipStatus};
use larder_domain::id::HouseholdId;
use larder_kitchen_schema::{
    household_accesses, household_memberships, households, outbox_events, users,
};

use crate::domain::repository::{HouseholdRepository, InviteRepository, MembershipRepository};
use crate::domain::types::{
    Household, HouseholdChanges, Invite, MemberView, Membership, MyHousehold, NewHousehold,
    NewInvite, OutboxEvent,
};
use crate::error::KitchenServiceError;

// ── Household repository ─────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbHouseholdRepository {
    pub db: DatabaseConnection,
}

impl DbHouseholdRepository {
    async fn find_live(&self, id: HouseholdId) -> Result<Option<households::Model>, DbErr> {
        households::Entity::find_by_id(id.0)
            .filter(households::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
    }
}

impl HouseholdRepository for DbHouseholdRepository {
    async fn find_by_id(&self, id: HouseholdId) -> Result<Option<Household>, KitchenServiceError> {
        let model = self.find_live(id).await.context("find household by id")?;
        Ok(model.map(household_from_model))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Household>, KitchenServiceError> {
        let model = households::Entity::find()
            .filter(households::Column::Slug.eq(slug))
            .filter(households::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .context("find household by slug")?;
        Ok(model.map(household_from_model))
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, KitchenServiceError> {
        let count = households::Entity::find()
            .filter(households::Column::Slug.eq(slug))
            .count(&self.db)
            .await
            .context("count households by slug")?;
        Ok(count > 0)
    }

    async fn create_with_owner(
        &self,
        household: &NewHousehold,
        owner_id: i64,
    ) -> Result<Household, KitchenServiceError> {
        let household = household.clone();
        let model = self
            .db
            .transaction::<_, households::Model, DbErr>(move |txn| {
                Box::pin(async move {
                    let now = Utc::now();
                    let model = households::ActiveModel {
                        name: Set(household.name),
                        slug: Set(household.slug),
                        locale: Set(household.locale),
                        currency: Set(household.currency),
                        new_members: Set(household.new_members),
                        created_at: Set(now),
                        updated_at: Set(now),
                        deleted_at: Set(None),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    household_memberships::ActiveModel {
                        household_id: Set(model.id),
                        user_id: Set(owner_id),
                        role: Set(MembershipRole::Owner.as_str().to_owned()),
                        status: Set(MembershipStatus::Approved.as_str().to_owned()),
                        approved_at: Set(Some(now)),
                        approved_by: Set(Some(owner_id)),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                    Ok(model)
                })
            })
            .await
            .context("create household with owner")?;
        Ok(household_from_model(model))
    }

    async fn update(
        &self,
        id: HouseholdId,
        changes: &HouseholdChanges,
    ) -> Result<Household, KitchenServiceError> {
        let model = self
            .find_live(id)
            .await
            .context("find household for update")?
            .ok_or(KitchenServiceError::HouseholdNotFound)?;
        let mut am = model.into_active_model();
        if let Some(name) = &changes.name {
            am.name = Set(name.clone());
        }
        if let Some(locale) = &changes.locale {
            am.locale = Set(locale.clone());
        }
        if let Some(currency) = &changes.currency {
            am.currency = Set(currency.clone());
        }
        am.updated_at = Set(Utc::now());
        let model = am.update(&self.db).await.context("update household")?;
        Ok(household_from_model(model))
    }

    async fn set_new_members(
        &self,
        id: HouseholdId,
        open: bool,
    ) -> Result<Household, KitchenServiceError> {
        let model = self
            .find_live(id)
            .await
            .context("find household for membership toggle")?
            .ok_or(KitchenServiceError::HouseholdNotFound)?;
        let mut am = model.into_active_model();
        am.new_members = Set(open);
        am.updated_at = Set(Utc::now());
        let model = am
            .update(&self.db)
            .await
            .context("update household new_members")?;
        Ok(household_from_model(model))
    }

    async fn soft_delete(&self, id: HouseholdId) -> Result<(), KitchenServiceError> {
        let now = Utc::now();
        households::Entity::update_many()
            .col_expr(households::Column::DeletedAt, Expr::value(now))
            .col_expr(households::Column::UpdatedAt, Expr::value(now))
            .filter(households::Column::Id.eq(id.0))
            .filter(households::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .context("soft delete household")?;
        Ok(())
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<MyHousehold>, KitchenServiceError> {
        let rows = households::Entity::find()
            .find_also_related(household_memberships::Entity)
            .filter(households::Column::DeletedAt.is_null())
            .filter(household_memberships::Column::UserId.eq(user_id))
            .filter(household_memberships::Column::Status.eq(MembershipStatus::Approved.as_str()))
            .order_by_asc(households::Column::Name)
            .order_by_asc(households::Column::Id)
            .all(&self.db)
            .await
            .context("list households for user")?;

        let mut result = Vec::with_capacity(rows.len());
        for (household, membership) in rows {
            let Some(membership) = membership else {
                continue;
            };
            result.push(MyHousehold {
                household: household_from_model(household),
                role: membership.role.parse().context("membership role")?,
            });
        }
        Ok(result)
    }
}

fn household_from_model(model: households::Model) -> Household {
    Household {
        id: HouseholdId(model.id),
        name: model.name,
        slug: model.slug,
        locale: model.locale,
        currency: model.currency,
        new_members: model.new_members,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Membership repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbMembershipRepository {
    pub db: DatabaseConnection,
}

impl MembershipRepository for DbMembershipRepository {
    async fn find(
        &self,
        household_id: HouseholdId,
        user_id: i64,
    ) -> Result<Option<Membership>, KitchenServiceError> {
        let model = household_memberships::Entity::find()
            .join(
                sea_orm::JoinType::InnerJoin,
                household_memberships::Relation::Household.def(),
            )
            .filter(household_memberships::Column::HouseholdId.eq(household_id.0))
            .filter(household_memberships::Column::UserId.eq(user_id))
            .filter(households::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .context("find membership")?;
        model.map(membership_from_model).transpose()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Membership>, KitchenServiceError> {
        let model = household_memberships::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find membership by id")?;
        model.map(membership_from_model).transpose()
    }

    async fn list(
        &self,
        household_id: HouseholdId,
        status: MembershipStatus,
    ) -> Result<Vec<MemberView>, KitchenServiceError> {
        let order_column = match status {
            MembershipStatus::Approved => household_memberships::Column::ApprovedAt,
            _ => household_memberships::Column::CreatedAt,
        };
        let rows = household_memberships::Entity::find()
            .find_also_related(users::Entity)
            .filter(household_memberships::Column::HouseholdId.eq(household_id.0))
            .filter(household_memberships::Column::Status.eq(status.as_str()))
            .order_by_desc(order_column)
            .order_by_desc(household_memberships::Column::Id)
            .all(&self.db)
            .await
            .context("list memberships")?;

        let mut result = Vec::with_capacity(rows.len());
        for (membership, user) in rows {
            let Some(user) = user else {
                continue;
            };
            result.push(MemberView {
                membership: membership_from_model(membership)?,
                name: user.name,
                email: user.email,
            });
        }
        Ok(result)
    }

    async fn request_join(
        &self,
        household_id: HouseholdId,
        user_id: i64,
    ) -> Result<Membership, KitchenServiceError> {
        let now = Utc::now();
        upsert_membership(
            &self.db,
            household_id.0,
            user_id,
            MembershipRole::Member,
            MembershipStatus::Pending,
            None,
            now,
        )
        .await
        .context("upsert join request")?;
        let model = find_membership_row(&self.db, household_id.0, user_id)
            .await
            .context("reload join request")?
            .context("join request missing after upsert")?;
        membership_from_model(model)
    }

    async fn review(
        &self,
        id: i64,
        status: MembershipStatus,
        reviewer_id: i64,
        at: DateTime<Utc>,
    ) -> Result<Membership, KitchenServiceError> {
        let result = review_pending(id, status, reviewer_id, at)
            .exec(&self.db)
            .await
            .context("review membership")?;
        let model = household_memberships::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("reload reviewed membership")?
            .ok_or(KitchenServiceError::MembershipNotFound)?;
        if result.rows_affected == 0 {
            return Err(KitchenServiceError::MembershipNotPending);
        }
        membership_from_model(model)
    }

    async fn delete(&self, id: i64) -> Result<bool, KitchenServiceError> {
        let result = household_memberships::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete membership")?;
        Ok(result.rows_affected > 0)
    }
}

/// Moves a membership out of `pending`. Matches nothing once another review has landed.
fn review_pending(
    id: i64,
    status: MembershipStatus,
    reviewer_id: i64,
    at: DateTime<Utc>,
) -> sea_orm::UpdateMany<household_memberships::Entity> {
    household_memberships::Entity::update_many()
        .col_expr(household_memberships::Column::Status, Expr::value(status.as_str()))
        .col_expr(household_memberships::Column::ApprovedBy, Expr::value(reviewer_id))
        .col_expr(
            household_memberships::Column::ApprovedAt,
            Expr::value((status == MembershipStatus::Approved).then_some(at)),
        )
        .col_expr(household_memberships::Column::UpdatedAt, Expr::value(at))
        .filter(household_memberships::Column::Id.eq(id))
        .filter(household_memberships::Column::Status.eq(MembershipStatus::Pending.as_str()))
}

async fn find_membership_row<C: ConnectionTrait>(
    conn: &C,
    household_id: i64,
    user_id: i64,
) -> Result<Option<household_memberships::Model>, DbErr> {
    household_memberships::Entity::find()
        .filter(household_memberships::Column::HouseholdId.eq(household_id))
        .filter(household_memberships::Column::UserId.eq(user_id))
        .one(conn)
        .await
}

/// Insert or overwrite the `(household, user)` membership row. `approved_by` is only
/// meaningful for approved rows and sets `approved_at` alongside it.
async fn upsert_membership<C: ConnectionTrait>(
    conn: &C,
    household_id: i64,
    user_id: i64,
    role: MembershipRole,
    status: MembershipStatus,
    approved_by: Option<i64>,
    now: DateTime<Utc>,
) -> Result<(), DbErr> {
    let approved_at = approved_by.map(|_| now);
    household_memberships::Entity::insert(household_memberships::ActiveModel {
        household_id: Set(household_id),
        user_id: Set(user_id),
        role: Set(role.as_str().to_owned()),
        status: Set(status.as_str().to_owned()),
        approved_at: Set(approved_at),
        approved_by: Set(approved_by),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    })
    .on_conflict(
        OnConflict::columns([
            household_memberships::Column::HouseholdId,
            household_memberships::Column::UserId,
        ])
        .update_columns([
            household_memberships::Column::Role,
            household_memberships::Column::Status,
            household_memberships::Column::ApprovedAt,
            household_memberships::Column::ApprovedBy,
            household_memberships::Column::UpdatedAt,
        ])
        .to_owned(),
    )
    .exec_without_returning(conn)
    .await?;
    Ok(())
}

fn membership_from_model(
    model: household_memberships::Model,
) -> Result<Membership, KitchenServiceError> {
    Ok(Membership {
        id: model.id,
        household_id: HouseholdId(model.household_id),
        user_id: model.user_id,
        role: model.role.parse().context("membership role")?,
        status: model.status.parse().context("membership status")?,
        approved_at: model.approved_at,
        approved_by: model.approved_by,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Invite repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbInviteRepository {
    pub db: DatabaseConnection,
}

impl InviteRepository for DbInviteRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Invite>, KitchenServiceError> {
        let model = household_accesses::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find invite by id")?;
        model.map(invite_from_model).transpose()
    }

    async fn find_pending_by_token(
        &self,
        token: &str,
    ) -> Result<Option<Invite>, KitchenServiceError> {
        let model = household_accesses::Entity::find()
            .filter(household_accesses::Column::Token.eq(token))
            .filter(household_accesses::Column::Status.eq(InviteStatus::Pending.as_str()))
            .one(&self.db)
            .await
            .context("find invite by token")?;
        model.map(invite_from_model).transpose()
    }

    async fn list_pending(
        &self,
        household_id: HouseholdId,
    ) -> Result<Vec<Invite>, KitchenServiceError> {
        let models = household_accesses::Entity::find()
            .filter(household_accesses::Column::HouseholdId.eq(household_id.0))
            .filter(household_accesses::Column::Status.eq(InviteStatus::Pending.as_str()))
            .order_by_desc(household_accesses::Column::CreatedAt)
            .order_by_desc(household_accesses::Column::Id)
            .all(&self.db)
            .await
            .context("list pending invites")?;
        models.into_iter().map(invite_from_model).collect()
    }

    async fn create_with_outbox(
        &self,
        invite: &NewInvite,
        event: &OutboxEvent,
    ) -> Result<Invite, KitchenServiceError> {
        let invite = invite.clone();
        let event = event.clone();
        let model = self
            .db
            .transaction::<_, household_accesses::Model, DbErr>(move |txn| {
                Box::pin(async move {
                    let now = Utc::now();
                    let model = household_accesses::ActiveModel {
                        household_id: Set(invite.household_id.0),
                        invited_by: Set(invite.invited_by),
                        name: Set(invite.name),
                        email: Set(invite.email),
                        token: Set(invite.token),
                        status: Set(InviteStatus::Pending.as_str().to_owned()),
                        accepted_at: Set(None),
                        expires_at: Set(invite.expires_at),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                    insert_outbox_event(txn, &event, now).await?;
                    Ok(model)
                })
            })
            .await
            .context("create invite with outbox event")?;
        invite_from_model(model)
    }

    async fn redeem(
        &self,
        invite: &Invite,
        user_id: i64,
        at: DateTime<Utc>,
    ) -> Result<Membership, KitchenServiceError> {
        let invite_id = invite.id;
        let household_id = invite.household_id.0;
        let invited_by = invite.invited_by;
        let result = self
            .db
            .transaction::<_, household_memberships::Model, DbErr>(move |txn| {
                Box::pin(async move {
                    let accepted = household_accesses::Entity::update_many()
                        .col_expr(
                            household_accesses::Column::Status,
                            Expr::value(InviteStatus::Accepted.as_str()),
                        )
                        .col_expr(household_accesses::Column::AcceptedAt, Expr::value(at))
                        .col_expr(household_accesses::Column::UpdatedAt, Expr::value(at))
                        .filter(household_accesses::Column::Id.eq(invite_id))
                        .filter(
                            household_accesses::Column::Status.eq(InviteStatus::Pending.as_str()),
                        )
                        .exec(txn)
                        .await?;
                    if accepted.rows_affected == 0 {
                        return Err(DbErr::RecordNotUpdated);
                    }

                    // Managers keep their role; everyone else joins as a member.
                    let existing = find_membership_row(txn, household_id, user_id).await?;
                    let role = existing
                        .filter(|m| m.status == MembershipStatus::Approved.as_str())
                        .and_then(|m| m.role.parse::<MembershipRole>().ok())
                        .filter(|role| role.can_manage())
                        .unwrap_or(MembershipRole::Member);

                    upsert_membership(
                        txn,
                        household_id,
                        user_id,
                        role,
                        MembershipStatus::Approved,
                        Some(invited_by),
                        at,
                    )
                    .await?;
                    find_membership_row(txn, household_id, user_id)
                        .await?
                        .ok_or_else(|| DbErr::RecordNotFound("membership".into()))
                })
            })
            .await;

        match result {
            Ok(model) => membership_from_model(model),
            Err(TransactionError::Transaction(DbErr::RecordNotUpdated)) => {
                Err(KitchenServiceError::InviteNotFound)
            }
            Err(e) => Err(anyhow::Error::from(e).context("redeem invite").into()),
        }
    }

    async fn revoke(&self, id: i64) -> Result<Option<Invite>, KitchenServiceError> {
        let now = Utc::now();
        let result = household_accesses::Entity::update_many()
            .col_expr(
                household_accesses::Column::Status,
                Expr::value(InviteStatus::Revoked.as_str()),
            )
            .col_expr(household_accesses::Column::UpdatedAt, Expr::value(now))
            .filter(household_accesses::Column::Id.eq(id))
            .filter(household_accesses::Column::Status.eq(InviteStatus::Pending.as_str()))
            .exec(&self.db)
            .await
            .context("revoke invite")?;
        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }
}

async fn insert_outbox_event<C: ConnectionTrait>(
    conn: &C,
    event: &OutboxEvent,
    now: DateTime<Utc>,
) -> Result<(), DbErr> {
    outbox_events::ActiveModel {
        id: Set(event.id),
        kind: Set(event.kind.clone()),
        payload: Set(event.payload.clone()),
        idempotency_key: Set(event.idempotency_key.clone()),
        attempts: Set(0),
        last_error: Set(None),
        created_at: Set(now),
        next_attempt_at: Set(now),
        processed_at: Set(None),
        failed_at: Set(None),
    }
    .insert(conn)
    .await?;
    Ok(())
}

fn invite_from_model(model: household_accesses::Model) -> Result<Invite, KitchenServiceError> {
    Ok(Invite {
        id: model.id,
        household_id: HouseholdId(model.household_id),
        invited_by: model.invited_by,
        name: model.name,
        email: model.email,
        token: model.token,
        status: model.status.parse().context("invite status")?,
        accepted_at: model.accepted_at,
        expires_at: model.expires_at,
        created_at: model.created_at,
    })
}
