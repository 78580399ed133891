use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use larder_domain::id::HouseholdId;

use crate::domain::types::InventoryItem;
use crate::error::KitchenServiceError;
use crate::handlers::parse_query;
use crate::state::AppState;
use crate::tenancy::RequireHousehold;
use crate::usecase::inventory::{
    CreateInventoryItemUseCase, DeleteInventoryItemUseCase, GetInventoryItemUseCase,
    InventoryInput, InventoryLocationsUseCase, ListInventoryUseCase, UpdateInventoryItemUseCase,
};

#[derive(Serialize)]
pub struct InventoryItemResponse {
    pub id: i64,
    pub household_id: HouseholdId,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: f64,
    pub unit: String,
    pub purchased_at: Option<NaiveDate>,
    pub expires_at: Option<NaiveDate>,
    pub category: Option<String>,
    pub location: Option<String>,
    #[serde(serialize_with = "larder_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "larder_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<InventoryItem> for InventoryItemResponse {
    fn from(item: InventoryItem) -> Self {
        Self {
            id: item.id,
            household_id: item.household_id,
            product_id: item.product_id,
            product_name: item.product_name,
            quantity: item.quantity,
            unit: item.unit,
            purchased_at: item.purchased_at,
            expires_at: item.expires_at,
            category: item.category,
            location: item.location,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

#[derive(Deserialize)]
pub struct InventoryItemRequest {
    pub product_id: Option<i64>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub purchased_at: Option<NaiveDate>,
    pub expires_at: Option<NaiveDate>,
    pub category: Option<String>,
    pub location: Option<String>,
}

impl From<InventoryItemRequest> for InventoryInput {
    fn from(body: InventoryItemRequest) -> Self {
        Self {
            product_id: body.product_id,
            quantity: body.quantity,
            unit: body.unit,
            purchased_at: body.purchased_at,
            expires_at: body.expires_at,
            category: body.category,
            location: body.location,
        }
    }
}

// ── GET /inventory-items ─────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct InventoryQuery {
    pub q: Option<String>,
    pub limit: Option<u64>,
}

pub async fn list_inventory(
    RequireHousehold(household_id): RequireHousehold,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Vec<InventoryItemResponse>>, KitchenServiceError> {
    let query: InventoryQuery = parse_query(raw_query)?;
    let usecase = ListInventoryUseCase {
        repo: state.inventory_repo(),
    };
    let items = usecase
        .execute(Some(household_id), query.q.as_deref(), query.limit)
        .await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

// ── GET /inventory-items/metadata ────────────────────────────────────────────

#[derive(Serialize)]
pub struct InventoryMetadataResponse {
    pub locations: Vec<String>,
}

pub async fn inventory_metadata(
    RequireHousehold(household_id): RequireHousehold,
    State(state): State<AppState>,
) -> Result<Json<InventoryMetadataResponse>, KitchenServiceError> {
    let usecase = InventoryLocationsUseCase {
        repo: state.inventory_repo(),
    };
    let locations = usecase.execute(Some(household_id)).await?;
    Ok(Json(InventoryMetadataResponse { locations }))
}

// ── POST /inventory-items ────────────────────────────────────────────────────

pub async fn create_inventory_item(
    RequireHousehold(household_id): RequireHousehold,
    State(state): State<AppState>,
    Json(body): Json<InventoryItemRequest>,
) -> Result<(StatusCode, Json<InventoryItemResponse>), KitchenServiceError> {
    let usecase = CreateInventoryItemUseCase {
        repo: state.inventory_repo(),
        products: state.product_repo(),
    };
    let item = usecase.execute(Some(household_id), body.into()).await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

// ── GET /inventory-items/{id} ────────────────────────────────────────────────

pub async fn get_inventory_item(
    RequireHousehold(household_id): RequireHousehold,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<InventoryItemResponse>, KitchenServiceError> {
    let usecase = GetInventoryItemUseCase {
        repo: state.inventory_repo(),
    };
    let item = usecase.execute(Some(household_id), id).await?;
    Ok(Json(item.into()))
}

// ── PUT /inventory-items/{id} ────────────────────────────────────────────────

pub async fn update_inventory_item(
    RequireHousehold(household_id): RequireHousehold,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<InventoryItemRequest>,
) -> Result<Json<InventoryItemResponse>, KitchenServiceError> {
    let usecase = UpdateInventoryItemUseCase {
        repo: state.inventory_repo(),
        products: state.product_repo(),
    };
    let item = usecase.execute(Some(household_id), id, body.into()).await?;
    Ok(Json(item.into()))
}

// ── DELETE /inventory-items/{id} ─────────────────────────────────────────────

pub async fn delete_inventory_item(
    RequireHousehold(household_id): RequireHousehold,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, KitchenServiceError> {
    let usecase = DeleteInventoryItemUseCase {
        repo: state.inventory_repo(),
    };
    usecase.execute(Some(household_id), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
