use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    IntoActiveModel as _, QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};

use larder_core::sea_ext::{ScopeToTenant as _, lower_contains};
use larder_domain::id::HouseholdId;
use larder_kitchen_schema::{inventory_items, products};

use super::{from_decimal, to_decimal};
use crate::domain::repository::InventoryRepository;
use crate::domain::types::{InventoryFields, InventoryItem};
use crate::error::KitchenServiceError;

#[derive(Clone)]
pub struct DbInventoryRepository {
    pub db: DatabaseConnection,
}

impl DbInventoryRepository {
    fn live(tenant: Option<HouseholdId>) -> sea_orm::Select<inventory_items::Entity> {
        inventory_items::Entity::find()
            .filter(inventory_items::Column::DeletedAt.is_null())
            .scope_to_tenant(inventory_items::Column::HouseholdId, tenant.map(|h| h.0))
    }

    async fn find_live(
        &self,
        tenant: Option<HouseholdId>,
        id: i64,
    ) -> Result<Option<inventory_items::Model>, sea_orm::DbErr> {
        Self::live(tenant)
            .filter(inventory_items::Column::Id.eq(id))
            .one(&self.db)
            .await
    }
}

impl InventoryRepository for DbInventoryRepository {
    async fn list(
        &self,
        tenant: Option<HouseholdId>,
        q: Option<&str>,
        limit: u64,
    ) -> Result<Vec<InventoryItem>, KitchenServiceError> {
        let mut query = Self::live(tenant).find_also_related(products::Entity);
        if let Some(q) = q {
            query = query.filter(
                Condition::any()
                    .add(lower_contains(
                        (inventory_items::Entity, inventory_items::Column::Category),
                        q,
                    ))
                    .add(lower_contains(
                        (inventory_items::Entity, inventory_items::Column::Location),
                        q,
                    ))
                    .add(lower_contains((products::Entity, products::Column::Name), q)),
            );
        }
        let rows = query
            .order_by_desc(inventory_items::Column::CreatedAt)
            .order_by_desc(inventory_items::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .context("list inventory items")?;
        Ok(rows.into_iter().map(item_from_row).collect())
    }

    async fn locations(
        &self,
        tenant: Option<HouseholdId>,
    ) -> Result<Vec<String>, KitchenServiceError> {
        let locations = Self::live(tenant)
            .select_only()
            .column(inventory_items::Column::Location)
            .distinct()
            .filter(inventory_items::Column::Location.is_not_null())
            .filter(inventory_items::Column::Location.ne(""))
            .order_by_asc(inventory_items::Column::Location)
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .context("list inventory locations")?;
        Ok(locations)
    }

    async fn get(
        &self,
        tenant: Option<HouseholdId>,
        id: i64,
    ) -> Result<Option<InventoryItem>, KitchenServiceError> {
        let row = Self::live(tenant)
            .filter(inventory_items::Column::Id.eq(id))
            .find_also_related(products::Entity)
            .one(&self.db)
            .await
            .context("find inventory item")?;
        Ok(row.map(item_from_row))
    }

    async fn create(
        &self,
        household_id: HouseholdId,
        fields: &InventoryFields,
    ) -> Result<InventoryItem, KitchenServiceError> {
        let now = Utc::now();
        let model = inventory_items::ActiveModel {
            household_id: Set(household_id.0),
            product_id: Set(fields.product_id),
            quantity: Set(to_decimal(fields.quantity).context("inventory quantity")?),
            unit: Set(fields.unit.clone()),
            purchased_at: Set(fields.purchased_at),
            expires_at: Set(fields.expires_at),
            category: Set(fields.category.clone()),
            location: Set(fields.location.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("create inventory item")?;

        self.get(Some(household_id), model.id)
            .await?
            .context("inventory item missing after insert")
            .map_err(Into::into)
    }

    async fn update(
        &self,
        tenant: Option<HouseholdId>,
        id: i64,
        fields: &InventoryFields,
    ) -> Result<Option<InventoryItem>, KitchenServiceError> {
        let Some(model) = self
            .find_live(tenant, id)
            .await
            .context("find inventory item for update")?
        else {
            return Ok(None);
        };
        let mut am = model.into_active_model();
        am.product_id = Set(fields.product_id);
        am.quantity = Set(to_decimal(fields.quantity).context("inventory quantity")?);
        am.unit = Set(fields.unit.clone());
        am.purchased_at = Set(fields.purchased_at);
        am.expires_at = Set(fields.expires_at);
        am.category = Set(fields.category.clone());
        am.location = Set(fields.location.clone());
        am.updated_at = Set(Utc::now());
        am.update(&self.db)
            .await
            .context("update inventory item")?;
        self.get(tenant, id).await
    }

    async fn soft_delete(
        &self,
        tenant: Option<HouseholdId>,
        id: i64,
    ) -> Result<bool, KitchenServiceError> {
        let now = Utc::now();
        let result = inventory_items::Entity::update_many()
            .col_expr(inventory_items::Column::DeletedAt, Expr::value(now))
            .col_expr(inventory_items::Column::UpdatedAt, Expr::value(now))
            .filter(inventory_items::Column::Id.eq(id))
            .filter(inventory_items::Column::DeletedAt.is_null())
            .scope_to_tenant(inventory_items::Column::HouseholdId, tenant.map(|h| h.0))
            .exec(&self.db)
            .await
            .context("soft delete inventory item")?;
        Ok(result.rows_affected > 0)
    }
}

fn item_from_row(
    (model, product): (inventory_items::Model, Option<products::Model>),
) -> InventoryItem {
    InventoryItem {
        id: model.id,
        household_id: HouseholdId(model.household_id),
        product_id: model.product_id,
        product_name: product.map(|p| p.name).unwrap_or_default(),
        quantity: from_decimal(model.quantity),
        unit: model.unit,
        purchased_at: model.purchased_at,
        expires_at: model.expires_at,
        category: model.category,
        location: model.location,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
