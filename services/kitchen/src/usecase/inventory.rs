use chrono::NaiveDate;

use larder_domain::id::HouseholdId;
use larder_domain::tenancy::stamp_household;

use crate::domain::repository::{InventoryRepository, ProductRepository};
use crate::domain::types::{InventoryFields, InventoryItem};
use crate::domain::validation::{ValidationErrors, check_max_len, check_required, non_blank};
use crate::error::KitchenServiceError;
use crate::usecase::catalog::catalog_search;

pub const DEFAULT_INVENTORY_LIMIT: u64 = 100;

/// Raw pantry item payload, shared by create and update.
#[derive(Debug, Clone, Default)]
pub struct InventoryInput {
    pub product_id: Option<i64>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub purchased_at: Option<NaiveDate>,
    pub expires_at: Option<NaiveDate>,
    pub category: Option<String>,
    pub location: Option<String>,
}

async fn validate<P: ProductRepository>(
    products: &P,
    input: InventoryInput,
) -> Result<InventoryFields, KitchenServiceError> {
    let mut errors = ValidationErrors::new();

    match input.product_id {
        None => errors.add("product_id", "product_id is required"),
        Some(id) => {
            if products.find_by_id(id).await?.is_none() {
                errors.add("product_id", "the selected product_id is invalid");
            }
        }
    }
    match input.quantity {
        None => errors.add("quantity", "quantity is required"),
        Some(q) if !q.is_finite() || q <= 0.0 => {
            errors.add("quantity", "quantity must be greater than 0");
        }
        Some(_) => {}
    }
    let unit = input.unit.as_deref().map(str::trim).unwrap_or_default();
    check_required(&mut errors, "unit", unit, 32);
    if let (Some(purchased), Some(expires)) = (input.purchased_at, input.expires_at) {
        if expires < purchased {
            errors.add(
                "expires_at",
                "expires_at must be a date after or equal to purchased_at",
            );
        }
    }
    let category = non_blank(input.category.as_deref());
    let location = non_blank(input.location.as_deref());
    check_max_len(&mut errors, "category", category, 100);
    check_max_len(&mut errors, "location", location, 100);
    errors.into_result()?;

    Ok(InventoryFields {
        product_id: input.product_id.unwrap_or_default(),
        quantity: input.quantity.unwrap_or_default(),
        unit: unit.to_owned(),
        purchased_at: input.purchased_at,
        expires_at: input.expires_at,
        category: category.map(str::to_owned),
        location: location.map(str::to_owned),
    })
}

// ── ListInventory ────────────────────────────────────────────────────────────

pub struct ListInventoryUseCase<R: InventoryRepository> {
    pub repo: R,
}

impl<R: InventoryRepository> ListInventoryUseCase<R> {
    pub async fn execute(
        &self,
        tenant: Option<HouseholdId>,
        q: Option<&str>,
        limit: Option<u64>,
    ) -> Result<Vec<InventoryItem>, KitchenServiceError> {
        let search = catalog_search(q, limit, DEFAULT_INVENTORY_LIMIT, false)?;
        self.repo
            .list(tenant, search.q.as_deref(), search.limit)
            .await
    }
}

// ── InventoryLocations ───────────────────────────────────────────────────────

pub struct InventoryLocationsUseCase<R: InventoryRepository> {
    pub repo: R,
}

impl<R: InventoryRepository> InventoryLocationsUseCase<R> {
    pub async fn execute(
        &self,
        tenant: Option<HouseholdId>,
    ) -> Result<Vec<String>, KitchenServiceError> {
        self.repo.locations(tenant).await
    }
}

// ── GetInventoryItem ─────────────────────────────────────────────────────────

pub struct GetInventoryItemUseCase<R: InventoryRepository> {
    pub repo: R,
}

impl<R: InventoryRepository> GetInventoryItemUseCase<R> {
    pub async fn execute(
        &self,
        tenant: Option<HouseholdId>,
        id: i64,
    ) -> Result<InventoryItem, KitchenServiceError> {
        self.repo
            .get(tenant, id)
            .await?
            .ok_or(KitchenServiceError::InventoryItemNotFound)
    }
}

// ── CreateInventoryItem ──────────────────────────────────────────────────────

pub struct CreateInventoryItemUseCase<R, P>
where
    R: InventoryRepository,
    P: ProductRepository,
{
    pub repo: R,
    pub products: P,
}

impl<R, P> CreateInventoryItemUseCase<R, P>
where
    R: InventoryRepository,
    P: ProductRepository,
{
    pub async fn execute(
        &self,
        tenant: Option<HouseholdId>,
        input: InventoryInput,
    ) -> Result<InventoryItem, KitchenServiceError> {
        let household_id =
            stamp_household(None, tenant).ok_or(KitchenServiceError::HouseholdRequired)?;
        let fields = validate(&self.products, input).await?;
        self.repo.create(household_id, &fields).await
    }
}

// ── UpdateInventoryItem ──────────────────────────────────────────────────────

pub struct UpdateInventoryItemUseCase<R, P>
where
    R: InventoryRepository,
    P: ProductRepository,
{
    pub repo: R,
    pub products: P,
}

impl<R, P> UpdateInventoryItemUseCase<R, P>
where
    R: InventoryRepository,
    P: ProductRepository,
{
    pub async fn execute(
        &self,
        tenant: Option<HouseholdId>,
        id: i64,
        input: InventoryInput,
    ) -> Result<InventoryItem, KitchenServiceError> {
        if self.repo.get(tenant, id).await?.is_none() {
            return Err(KitchenServiceError::InventoryItemNotFound);
        }
        let fields = validate(&self.products, input).await?;
        self.repo
            .update(tenant, id, &fields)
            .await?
            .ok_or(KitchenServiceError::InventoryItemNotFound)
    }
}

// ── DeleteInventoryItem ──────────────────────────────────────────────────────

pub struct DeleteInventoryItemUseCase<R: InventoryRepository> {
    pub repo: R,
}

impl<R: InventoryRepository> DeleteInventoryItemUseCase<R> {
    pub async fn execute(
        &self,
        tenant: Option<HouseholdId>,
        id: i64,
    ) -> Result<(), KitchenServiceError> {
        if !self.repo.soft_delete(tenant, id).await? {
            return Err(KitchenServiceError::InventoryItemNotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;

    use crate::domain::types::{CatalogSearch, NewProduct, Product};

    #[derive(Default)]
    struct MockInventoryRepo {
        rows: Mutex<Vec<InventoryItem>>,
    }

    fn in_tenant(item: &InventoryItem, tenant: Option<HouseholdId>) -> bool {
        tenant.is_none_or(|t| item.household_id == t)
    }

    impl InventoryRepository for MockInventoryRepo {
        async fn list(
            &self,
            tenant: Option<HouseholdId>,
            _q: Option<&str>,
            _limit: u64,
        ) -> Result<Vec<InventoryItem>, KitchenServiceError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().filter(|i| in_tenant(i, tenant)).cloned().collect())
        }
        async fn locations(
            &self,
            _tenant: Option<HouseholdId>,
        ) -> Result<Vec<String>, KitchenServiceError> {
            Ok(vec![])
        }
        async fn get(
            &self,
            tenant: Option<HouseholdId>,
            id: i64,
        ) -> Result<Option<InventoryItem>, KitchenServiceError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .find(|i| i.id == id && in_tenant(i, tenant))
                .cloned())
        }
        async fn create(
            &self,
            household_id: HouseholdId,
            fields: &InventoryFields,
        ) -> Result<InventoryItem, KitchenServiceError> {
            let mut rows = self.rows.lock().unwrap();
            let item = InventoryItem {
                id: rows.len() as i64 + 1,
                household_id,
                product_id: fields.product_id,
                product_name: "Milk".into(),
                quantity: fields.quantity,
                unit: fields.unit.clone(),
                purchased_at: fields.purchased_at,
                expires_at: fields.expires_at,
                category: fields.category.clone(),
                location: fields.location.clone(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            rows.push(item.clone());
            Ok(item)
        }
        async fn update(
            &self,
            tenant: Option<HouseholdId>,
            id: i64,
            fields: &InventoryFields,
        ) -> Result<Option<InventoryItem>, KitchenServiceError> {
            let mut rows = self.rows.lock().unwrap();
            Ok(rows
                .iter_mut()
                .find(|i| i.id == id && in_tenant(i, tenant))
                .map(|i| {
                    i.quantity = fields.quantity;
                    i.unit = fields.unit.clone();
                    i.clone()
                }))
        }
        async fn soft_delete(
            &self,
            tenant: Option<HouseholdId>,
            id: i64,
        ) -> Result<bool, KitchenServiceError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|i| !(i.id == id && in_tenant(i, tenant)));
            Ok(rows.len() < before)
        }
    }

    struct MockProductRepo;

    impl ProductRepository for MockProductRepo {
        async fn search(
            &self,
            _search: &CatalogSearch,
        ) -> Result<Vec<Product>, KitchenServiceError> {
            Ok(vec![])
        }
        async fn find_by_id(&self, id: i64) -> Result<Option<Product>, KitchenServiceError> {
            Ok((id == 1).then(|| Product {
                id: 1,
                slug: "milk".into(),
                name: "Milk".into(),
                company: None,
                ingredient_id: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }))
        }
        async fn slug_exists(&self, _slug: &str) -> Result<bool, KitchenServiceError> {
            Ok(false)
        }
        async fn create(&self, _product: &NewProduct) -> Result<Product, KitchenServiceError> {
            unimplemented!()
        }
    }

    fn input() -> InventoryInput {
        InventoryInput {
            product_id: Some(1),
            quantity: Some(2.5),
            unit: Some(" l ".into()),
            purchased_at: NaiveDate::from_ymd_opt(2026, 3, 1),
            expires_at: NaiveDate::from_ymd_opt(2026, 3, 8),
            category: Some("dairy".into()),
            location: Some("fridge".into()),
        }
    }

    #[tokio::test]
    async fn should_stamp_item_with_tenant() {
        let usecase = CreateInventoryItemUseCase {
            repo: MockInventoryRepo::default(),
            products: MockProductRepo,
        };
        let item = usecase.execute(Some(HouseholdId(4)), input()).await.unwrap();
        assert_eq!(item.household_id, HouseholdId(4));
        assert_eq!(item.unit, "l");
    }

    #[tokio::test]
    async fn should_require_household_to_create() {
        let usecase = CreateInventoryItemUseCase {
            repo: MockInventoryRepo::default(),
            products: MockProductRepo,
        };
        let result = usecase.execute(None, input()).await;
        assert!(matches!(result, Err(KitchenServiceError::HouseholdRequired)));
    }

    #[tokio::test]
    async fn should_validate_quantity_product_and_dates() {
        let usecase = CreateInventoryItemUseCase {
            repo: MockInventoryRepo::default(),
            products: MockProductRepo,
        };
        let result = usecase
            .execute(
                Some(HouseholdId(4)),
                InventoryInput {
                    product_id: Some(99),
                    quantity: Some(0.0),
                    unit: None,
                    purchased_at: NaiveDate::from_ymd_opt(2026, 3, 8),
                    expires_at: NaiveDate::from_ymd_opt(2026, 3, 1),
                    ..Default::default()
                },
            )
            .await;
        let Err(KitchenServiceError::Validation(errors)) = result else {
            panic!("expected validation error");
        };
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(fields, vec!["expires_at", "product_id", "quantity", "unit"]);
    }

    #[tokio::test]
    async fn should_hide_other_households_items() {
        let repo = MockInventoryRepo::default();
        let create = CreateInventoryItemUseCase {
            repo,
            products: MockProductRepo,
        };
        let item = create.execute(Some(HouseholdId(1)), input()).await.unwrap();

        let get = GetInventoryItemUseCase { repo: create.repo };
        let result = get.execute(Some(HouseholdId(2)), item.id).await;
        assert!(matches!(
            result,
            Err(KitchenServiceError::InventoryItemNotFound)
        ));

        let delete = DeleteInventoryItemUseCase { repo: get.repo };
        let result = delete.execute(Some(HouseholdId(2)), item.id).await;
        assert!(matches!(
            result,
            Err(KitchenServiceError::InventoryItemNotFound)
        ));
        delete.execute(Some(HouseholdId(1)), item.id).await.unwrap();
    }
}
