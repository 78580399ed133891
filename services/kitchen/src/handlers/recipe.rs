use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use serde::Serialize;

use larder_auth_types::identity::IdentityHeaders;
use larder_domain::id::HouseholdId;
use larder_domain::pagination::Page;
use larder_domain::recipe::SourceType;

use crate::domain::types::{IngredientRef, Recipe, RecipeIngredientLine, RecipeStep};
use crate::error::KitchenServiceError;
use crate::handlers::parse_query;
use crate::handlers::tag::TagResponse;
use crate::state::AppState;
use crate::tenancy::RequireHousehold;
use crate::usecase::recipe::{
    CreateRecipeUseCase, DeleteRecipeUseCase, GetRecipeUseCase, ListRecipesUseCase, RecipeInput,
    RecipeQuery, UpdateRecipeUseCase,
};

#[derive(Serialize)]
pub struct StepResponse {
    pub id: i64,
    pub position: i32,
    pub instruction: String,
    pub timer_seconds: Option<i32>,
}

impl From<RecipeStep> for StepResponse {
    fn from(step: RecipeStep) -> Self {
        Self {
            id: step.id,
            position: step.position,
            instruction: step.instruction,
            timer_seconds: step.timer_seconds,
        }
    }
}

#[derive(Serialize)]
pub struct IngredientRefResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl From<IngredientRef> for IngredientRefResponse {
    fn from(ingredient: IngredientRef) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
            slug: ingredient.slug,
        }
    }
}

#[derive(Serialize)]
pub struct IngredientLineResponse {
    pub id: i64,
    pub position: i32,
    pub ingredient: Option<IngredientRefResponse>,
    pub ingredient_text: Option<String>,
    pub amount: Option<f64>,
    pub unit: Option<String>,
    pub preparation_note: Option<String>,
    pub is_optional: bool,
}

impl From<RecipeIngredientLine> for IngredientLineResponse {
    fn from(line: RecipeIngredientLine) -> Self {
        Self {
            id: line.id,
            position: line.position,
            ingredient: line.ingredient.map(Into::into),
            ingredient_text: line.ingredient_text,
            amount: line.amount,
            unit: line.unit,
            preparation_note: line.preparation_note,
            is_optional: line.is_optional,
        }
    }
}

#[derive(Serialize)]
pub struct RecipeResponse {
    pub id: i64,
    pub household_id: HouseholdId,
    pub created_by_user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub prep_time_minutes: Option<i32>,
    pub cook_time_minutes: Option<i32>,
    pub servings: Option<i32>,
    pub source_type: SourceType,
    pub source_url: Option<String>,
    pub nutrition: Option<serde_json::Value>,
    pub steps: Vec<StepResponse>,
    pub ingredients: Vec<IngredientLineResponse>,
    pub tags: Vec<TagResponse>,
    #[serde(serialize_with = "larder_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "larder_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Recipe> for RecipeResponse {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            household_id: recipe.household_id,
            created_by_user_id: recipe.created_by_user_id,
            title: recipe.title,
            description: recipe.description,
            prep_time_minutes: recipe.prep_time_minutes,
            cook_time_minutes: recipe.cook_time_minutes,
            servings: recipe.servings,
            source_type: recipe.source_type,
            source_url: recipe.source_url,
            nutrition: recipe.nutrition,
            steps: recipe.steps.into_iter().map(Into::into).collect(),
            ingredients: recipe.ingredients.into_iter().map(Into::into).collect(),
            tags: recipe.tags.into_iter().map(Into::into).collect(),
            created_at: recipe.created_at,
            updated_at: recipe.updated_at,
        }
    }
}

// ── GET /recipes ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RecipeListResponse {
    pub items: Vec<RecipeResponse>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub last_page: u32,
}

impl From<Page<Recipe>> for RecipeListResponse {
    fn from(page: Page<Recipe>) -> Self {
        let last_page = page.last_page();
        Self {
            items: page.items.into_iter().map(Into::into).collect(),
            total: page.total,
            page: page.page,
            per_page: page.per_page,
            last_page,
        }
    }
}

pub async fn list_recipes(
    RequireHousehold(household_id): RequireHousehold,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<RecipeListResponse>, KitchenServiceError> {
    let query: RecipeQuery = parse_query(raw_query)?;
    let usecase = ListRecipesUseCase {
        recipes: state.recipe_repo(),
    };
    let page = usecase.execute(Some(household_id), query).await?;
    Ok(Json(page.into()))
}

// ── POST /recipes ────────────────────────────────────────────────────────────

pub async fn create_recipe(
    RequireHousehold(household_id): RequireHousehold,
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<RecipeInput>,
) -> Result<(StatusCode, Json<RecipeResponse>), KitchenServiceError> {
    let usecase = CreateRecipeUseCase {
        recipes: state.recipe_repo(),
        ingredients: state.ingredient_repo(),
    };
    let recipe = usecase
        .execute(Some(household_id), identity.user_id, body)
        .await?;
    Ok((StatusCode::CREATED, Json(recipe.into())))
}

// ── GET /recipes/{id} ────────────────────────────────────────────────────────

pub async fn get_recipe(
    RequireHousehold(household_id): RequireHousehold,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RecipeResponse>, KitchenServiceError> {
    let usecase = GetRecipeUseCase {
        recipes: state.recipe_repo(),
    };
    let recipe = usecase.execute(Some(household_id), id).await?;
    Ok(Json(recipe.into()))
}

// ── PUT /recipes/{id} ────────────────────────────────────────────────────────

pub async fn update_recipe(
    RequireHousehold(household_id): RequireHousehold,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<RecipeInput>,
) -> Result<Json<RecipeResponse>, KitchenServiceError> {
    let usecase = UpdateRecipeUseCase {
        recipes: state.recipe_repo(),
        ingredients: state.ingredient_repo(),
    };
    let recipe = usecase.execute(Some(household_id), id, body).await?;
    Ok(Json(recipe.into()))
}

// ── DELETE /recipes/{id} ─────────────────────────────────────────────────────

pub async fn delete_recipe(
    RequireHousehold(household_id): RequireHousehold,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, KitchenServiceError> {
    let usecase = DeleteRecipeUseCase {
        recipes: state.recipe_repo(),
    };
    usecase.execute(Some(household_id), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
