use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use larder_auth_types::identity::IdentityHeaders;

use crate::domain::types::{Ingredient, Product};
use crate::error::KitchenServiceError;
use crate::handlers::parse_query;
use crate::state::AppState;
use crate::usecase::catalog::{
    CreateIngredientInput, CreateIngredientUseCase, CreateProductInput, CreateProductUseCase,
    DEFAULT_CATALOG_LIMIT, DeleteIngredientUseCase, ListIngredientsUseCase, ListProductsUseCase,
    RestoreIngredientUseCase, catalog_search,
};

#[derive(Serialize)]
pub struct IngredientResponse {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub category: Option<String>,
    #[serde(serialize_with = "larder_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "larder_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "larder_core::serde::to_rfc3339_ms_opt")]
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id,
            slug: ingredient.slug,
            name: ingredient.name,
            category: ingredient.category,
            created_at: ingredient.created_at,
            updated_at: ingredient.updated_at,
            deleted_at: ingredient.deleted_at,
        }
    }
}

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub company: Option<String>,
    pub ingredient_id: Option<i64>,
    #[serde(serialize_with = "larder_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "larder_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            slug: product.slug,
            name: product.name,
            company: product.company,
            ingredient_id: product.ingredient_id,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[derive(Deserialize, Default)]
pub struct CatalogQuery {
    pub q: Option<String>,
    pub limit: Option<u64>,
    #[serde(default)]
    pub with_deleted: bool,
}

// ── GET /ingredients ─────────────────────────────────────────────────────────

pub async fn list_ingredients(
    _identity: IdentityHeaders,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Vec<IngredientResponse>>, KitchenServiceError> {
    let query: CatalogQuery = parse_query(raw_query)?;
    let search = catalog_search(
        query.q.as_deref(),
        query.limit,
        DEFAULT_CATALOG_LIMIT,
        query.with_deleted,
    )?;
    let usecase = ListIngredientsUseCase {
        repo: state.ingredient_repo(),
    };
    let ingredients = usecase.execute(search).await?;
    Ok(Json(ingredients.into_iter().map(Into::into).collect()))
}

// ── POST /ingredients ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateIngredientRequest {
    #[serde(default)]
    pub name: String,
    pub category: Option<String>,
}

pub async fn create_ingredient(
    _identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<CreateIngredientRequest>,
) -> Result<(StatusCode, Json<IngredientResponse>), KitchenServiceError> {
    let usecase = CreateIngredientUseCase {
        repo: state.ingredient_repo(),
    };
    let ingredient = usecase
        .execute(CreateIngredientInput {
            name: body.name,
            category: body.category,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(ingredient.into())))
}

// ── DELETE /ingredients/{id} ─────────────────────────────────────────────────

pub async fn delete_ingredient(
    _identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, KitchenServiceError> {
    let usecase = DeleteIngredientUseCase {
        repo: state.ingredient_repo(),
    };
    usecase.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /ingredients/{id}/restore ───────────────────────────────────────────

pub async fn restore_ingredient(
    _identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<IngredientResponse>, KitchenServiceError> {
    let usecase = RestoreIngredientUseCase {
        repo: state.ingredient_repo(),
    };
    let ingredient = usecase.execute(id).await?;
    Ok(Json(ingredient.into()))
}

// ── GET /products ────────────────────────────────────────────────────────────

pub async fn list_products(
    _identity: IdentityHeaders,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Vec<ProductResponse>>, KitchenServiceError> {
    let query: CatalogQuery = parse_query(raw_query)?;
    let search = catalog_search(query.q.as_deref(), query.limit, DEFAULT_CATALOG_LIMIT, false)?;
    let usecase = ListProductsUseCase {
        repo: state.product_repo(),
    };
    let products = usecase.execute(search).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

// ── POST /products ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateProductRequest {
    #[serde(default)]
    pub name: String,
    pub company: Option<String>,
    pub ingredient_id: Option<i64>,
}

pub async fn create_product(
    _identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), KitchenServiceError> {
    let usecase = CreateProductUseCase {
        products: state.product_repo(),
        ingredients: state.ingredient_repo(),
    };
    let product = usecase
        .execute(CreateProductInput {
            name: body.name,
            company: body.company,
            ingredient_id: body.ingredient_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}
