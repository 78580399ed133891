use std::collections::HashSet;

use serde::Deserialize;

use larder_domain::id::HouseholdId;
use larder_domain::pagination::{Page, PageRequest};
use larder_domain::recipe::SourceType;
use larder_domain::slug::slugify;
use larder_domain::tenancy::stamp_household;

use crate::domain::repository::{IngredientRepository, RecipeRepository};
use crate::domain::types::{
    IngredientLineDraft, MAX_RECIPE_INGREDIENTS, MAX_RECIPE_STEPS, MAX_RECIPE_TAGS, Recipe,
    RecipeDraft, RecipeFields, RecipeFilter, RecipeTarget, StepDraft, TagDraft,
};
use crate::domain::validation::{
    ValidationErrors, char_len, check_max_len, check_range, check_required, is_http_url,
    non_blank,
};
use crate::error::KitchenServiceError;

const INGREDIENT_ROW_MESSAGE: &str =
    "Each ingredient row must include ingredient_id, ingredient_slug, or ingredient_text.";

// ── Payload ──────────────────────────────────────────────────────────────────

/// Recipe payload as submitted. Create and update take the same shape; update replaces
/// every child collection with what is sent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeInput {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub prep_time_minutes: Option<i64>,
    pub cook_time_minutes: Option<i64>,
    pub servings: Option<i64>,
    pub source_type: Option<String>,
    pub source_url: Option<String>,
    pub nutrition: Option<serde_json::Value>,
    #[serde(default)]
    pub steps: Vec<StepInput>,
    #[serde(default)]
    pub ingredients: Vec<IngredientLineInput>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StepInput {
    #[serde(default)]
    pub instruction: String,
    pub timer_seconds: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngredientLineInput {
    pub ingredient_id: Option<i64>,
    pub ingredient_slug: Option<String>,
    pub ingredient_text: Option<String>,
    pub amount: Option<f64>,
    pub unit: Option<String>,
    pub preparation_note: Option<String>,
    #[serde(default)]
    pub is_optional: bool,
}

fn to_i32(value: Option<i64>) -> Option<i32> {
    value.and_then(|v| i32::try_from(v).ok())
}

/// Trimmed names to unique slugs. Names that slug to nothing are skipped and the first
/// spelling of each slug wins.
pub fn normalize_tags(names: &[String]) -> Vec<TagDraft> {
    let mut seen = HashSet::new();
    names
        .iter()
        .filter_map(|name| {
            let name = name.trim();
            let slug = slugify(name);
            (!slug.is_empty() && seen.insert(slug.clone())).then(|| TagDraft {
                slug,
                name: name.to_owned(),
            })
        })
        .collect()
}

fn validate_fields(errors: &mut ValidationErrors, input: &RecipeInput) -> RecipeFields {
    check_required(errors, "title", &input.title, 255);

    let description = non_blank(input.description.as_deref());
    check_max_len(errors, "description", description, 4000);
    check_range(errors, "prep_time_minutes", input.prep_time_minutes, 0, 1440);
    check_range(errors, "cook_time_minutes", input.cook_time_minutes, 0, 1440);
    check_range(errors, "servings", input.servings, 1, 100);

    let source_type = match non_blank(input.source_type.as_deref()) {
        None => SourceType::default(),
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            errors.add("source_type", "the selected source_type is invalid");
            SourceType::default()
        }),
    };

    let source_url = non_blank(input.source_url.as_deref());
    if let Some(url) = source_url {
        if char_len(url) > 2048 {
            errors.add("source_url", "source_url may not be greater than 2048 characters");
        } else if !is_http_url(url) {
            errors.add("source_url", "source_url must be a valid URL");
        }
    }

    let nutrition = match &input.nutrition {
        None | Some(serde_json::Value::Null) => None,
        Some(value @ serde_json::Value::Object(_)) => Some(value.clone()),
        Some(_) => {
            errors.add("nutrition", "nutrition must be an object");
            None
        }
    };

    RecipeFields {
        title: input.title.trim().to_owned(),
        description: description.map(str::to_owned),
        prep_time_minutes: to_i32(input.prep_time_minutes),
        cook_time_minutes: to_i32(input.cook_time_minutes),
        servings: to_i32(input.servings),
        source_type,
        source_url: source_url.map(str::to_owned),
        nutrition,
    }
}

fn validate_steps(errors: &mut ValidationErrors, steps: &[StepInput]) -> Vec<StepDraft> {
    if steps.is_empty() {
        errors.add("steps", "steps must have at least 1 item");
    } else if steps.len() > MAX_RECIPE_STEPS {
        errors.add(
            "steps",
            format!("steps may not have more than {MAX_RECIPE_STEPS} items"),
        );
    }

    steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let instruction = step.instruction.trim();
            let field = format!("steps.{i}.instruction");
            match char_len(instruction) {
                0 => errors.add(&field, format!("{field} is required")),
                1 => errors.add(&field, format!("{field} must be at least 2 characters")),
                n if n > 1000 => errors.add(
                    &field,
                    format!("{field} may not be greater than 1000 characters"),
                ),
                _ => {}
            }
            check_range(
                errors,
                &format!("steps.{i}.timer_seconds"),
                step.timer_seconds,
                1,
                86_400,
            );
            StepDraft {
                instruction: instruction.to_owned(),
                timer_seconds: to_i32(step.timer_seconds),
            }
        })
        .collect()
}

fn validate_ingredient_rows(errors: &mut ValidationErrors, rows: &[IngredientLineInput]) {
    if rows.is_empty() {
        errors.add("ingredients", "ingredients must have at least 1 item");
    } else if rows.len() > MAX_RECIPE_INGREDIENTS {
        errors.add(
            "ingredients",
            format!("ingredients may not have more than {MAX_RECIPE_INGREDIENTS} items"),
        );
    }

    for (i, row) in rows.iter().enumerate() {
        let slug = non_blank(row.ingredient_slug.as_deref());
        let text = non_blank(row.ingredient_text.as_deref());
        if row.ingredient_id.is_none() && slug.is_none() && text.is_none() {
            errors.add(format!("ingredients.{i}"), INGREDIENT_ROW_MESSAGE);
        }
        check_max_len(errors, &format!("ingredients.{i}.ingredient_slug"), slug, 255);
        check_max_len(errors, &format!("ingredients.{i}.ingredient_text"), text, 255);
        check_max_len(
            errors,
            &format!("ingredients.{i}.unit"),
            non_blank(row.unit.as_deref()),
            32,
        );
        check_max_len(
            errors,
            &format!("ingredients.{i}.preparation_note"),
            non_blank(row.preparation_note.as_deref()),
            512,
        );
        if let Some(amount) = row.amount {
            if !amount.is_finite() || !(0.0..=1_000_000.0).contains(&amount) {
                errors.add(
                    format!("ingredients.{i}.amount"),
                    format!("ingredients.{i}.amount must be between 0 and 1000000"),
                );
            }
        }
    }
}

fn validate_tags(errors: &mut ValidationErrors, tags: &[String]) {
    if tags.len() > MAX_RECIPE_TAGS {
        errors.add(
            "tags",
            format!("tags may not have more than {MAX_RECIPE_TAGS} items"),
        );
    }
    for (i, tag) in tags.iter().enumerate() {
        let len = char_len(tag.trim());
        if !(1..=64).contains(&len) {
            errors.add(
                format!("tags.{i}"),
                format!("tags.{i} must be between 1 and 64 characters"),
            );
        }
    }
}

/// Validate the whole payload, then resolve ingredient references against the catalog.
/// Nothing is written here; any error leaves storage untouched.
pub async fn build_draft<I: IngredientRepository>(
    ingredients: &I,
    input: RecipeInput,
) -> Result<RecipeDraft, KitchenServiceError> {
    let mut errors = ValidationErrors::new();
    let fields = validate_fields(&mut errors, &input);
    let steps = validate_steps(&mut errors, &input.steps);
    validate_ingredient_rows(&mut errors, &input.ingredients);
    validate_tags(&mut errors, &input.tags);

    for (i, row) in input.ingredients.iter().enumerate() {
        if let Some(id) = row.ingredient_id {
            if ingredients.find_by_id(id, true).await?.is_none() {
                errors.add(
                    format!("ingredients.{i}.ingredient_id"),
                    format!("the selected ingredients.{i}.ingredient_id is invalid"),
                );
            }
        }
    }
    errors.into_result()?;

    let mut lines = Vec::with_capacity(input.ingredients.len());
    for row in &input.ingredients {
        // Slug-only rows link to the catalog entry, soft-deleted or not; unknown slugs
        // keep the row unlinked.
        let ingredient_id = match (row.ingredient_id, non_blank(row.ingredient_slug.as_deref())) {
            (Some(id), _) => Some(id),
            (None, Some(slug)) => ingredients.find_id_by_slug(slug, true).await?,
            (None, None) => None,
        };
        lines.push(IngredientLineDraft {
            ingredient_id,
            ingredient_text: non_blank(row.ingredient_text.as_deref()).map(str::to_owned),
            amount: row.amount,
            unit: non_blank(row.unit.as_deref()).map(str::to_owned),
            preparation_note: non_blank(row.preparation_note.as_deref()).map(str::to_owned),
            is_optional: row.is_optional,
        });
    }

    Ok(RecipeDraft {
        fields,
        steps,
        ingredients: lines,
        tags: normalize_tags(&input.tags),
    })
}

// ── CreateRecipe ─────────────────────────────────────────────────────────────

pub struct CreateRecipeUseCase<R, I>
where
    R: RecipeRepository,
    I: IngredientRepository,
{
    pub recipes: R,
    pub ingredients: I,
}

impl<R, I> CreateRecipeUseCase<R, I>
where
    R: RecipeRepository,
    I: IngredientRepository,
{
    pub async fn execute(
        &self,
        tenant: Option<HouseholdId>,
        user_id: i64,
        input: RecipeInput,
    ) -> Result<Recipe, KitchenServiceError> {
        let household_id =
            stamp_household(None, tenant).ok_or(KitchenServiceError::HouseholdRequired)?;
        let draft = build_draft(&self.ingredients, input).await?;
        let recipe = self
            .recipes
            .write(
                tenant,
                RecipeTarget::Create {
                    household_id,
                    created_by_user_id: user_id,
                },
                &draft,
            )
            .await?;
        tracing::info!(
            recipe_id = recipe.id,
            household_id = household_id.0,
            steps = recipe.steps.len(),
            ingredients = recipe.ingredients.len(),
            "recipe created"
        );
        Ok(recipe)
    }
}

// ── UpdateRecipe ─────────────────────────────────────────────────────────────

pub struct UpdateRecipeUseCase<R, I>
where
    R: RecipeRepository,
    I: IngredientRepository,
{
    pub recipes: R,
    pub ingredients: I,
}

impl<R, I> UpdateRecipeUseCase<R, I>
where
    R: RecipeRepository,
    I: IngredientRepository,
{
    pub async fn execute(
        &self,
        tenant: Option<HouseholdId>,
        recipe_id: i64,
        input: RecipeInput,
    ) -> Result<Recipe, KitchenServiceError> {
        if self.recipes.get(tenant, recipe_id).await?.is_none() {
            return Err(KitchenServiceError::RecipeNotFound);
        }
        let draft = build_draft(&self.ingredients, input).await?;
        self.recipes
            .write(tenant, RecipeTarget::Replace { recipe_id }, &draft)
            .await
    }
}

// ── GetRecipe ────────────────────────────────────────────────────────────────

pub struct GetRecipeUseCase<R: RecipeRepository> {
    pub recipes: R,
}

impl<R: RecipeRepository> GetRecipeUseCase<R> {
    pub async fn execute(
        &self,
        tenant: Option<HouseholdId>,
        recipe_id: i64,
    ) -> Result<Recipe, KitchenServiceError> {
        self.recipes
            .get(tenant, recipe_id)
            .await?
            .ok_or(KitchenServiceError::RecipeNotFound)
    }
}

// ── DeleteRecipe ─────────────────────────────────────────────────────────────

pub struct DeleteRecipeUseCase<R: RecipeRepository> {
    pub recipes: R,
}

impl<R: RecipeRepository> DeleteRecipeUseCase<R> {
    pub async fn execute(
        &self,
        tenant: Option<HouseholdId>,
        recipe_id: i64,
    ) -> Result<(), KitchenServiceError> {
        if !self.recipes.soft_delete(tenant, recipe_id).await? {
            return Err(KitchenServiceError::RecipeNotFound);
        }
        Ok(())
    }
}

// ── ListRecipes ──────────────────────────────────────────────────────────────

/// Query string of the recipe list. `tags[]=a&tags[]=b` and a single `tag` combine.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeQuery {
    pub q: Option<String>,
    pub tag: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub ingredient_id: Option<i64>,
    pub ingredient_slug: Option<String>,
    pub max_cook_time: Option<i64>,
    pub source_type: Option<String>,
    pub per_page: Option<i64>,
    pub page: Option<i64>,
}

impl RecipeQuery {
    pub fn into_filter(self) -> Result<(RecipeFilter, PageRequest), KitchenServiceError> {
        let mut errors = ValidationErrors::new();

        let q = non_blank(self.q.as_deref()).map(str::to_lowercase);
        check_max_len(&mut errors, "q", q.as_deref(), 100);
        check_max_len(&mut errors, "tag", self.tag.as_deref(), 255);
        if self.tags.len() > MAX_RECIPE_TAGS {
            errors.add(
                "tags",
                format!("tags may not have more than {MAX_RECIPE_TAGS} items"),
            );
        }
        for (i, tag) in self.tags.iter().enumerate() {
            check_max_len(&mut errors, &format!("tags.{i}"), Some(tag), 255);
        }
        let ingredient_slug = non_blank(self.ingredient_slug.as_deref()).map(str::to_owned);
        check_max_len(&mut errors, "ingredient_slug", ingredient_slug.as_deref(), 255);
        check_range(&mut errors, "max_cook_time", self.max_cook_time, 1, 1440);
        check_range(&mut errors, "per_page", self.per_page, 1, 100);
        if self.page.is_some_and(|p| p < 1) {
            errors.add("page", "page must be at least 1");
        }
        let source_type = match non_blank(self.source_type.as_deref()) {
            None => None,
            Some(raw) => match raw.parse::<SourceType>() {
                Ok(source_type) => Some(source_type),
                Err(_) => {
                    errors.add("source_type", "the selected source_type is invalid");
                    None
                }
            },
        };
        errors.into_result()?;

        let mut seen = HashSet::new();
        let tag_slugs = self
            .tag
            .iter()
            .chain(self.tags.iter())
            .map(|t| slugify(t.trim()))
            .filter(|slug| !slug.is_empty() && seen.insert(slug.clone()))
            .collect();

        let page = PageRequest {
            per_page: self
                .per_page
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(PageRequest::default().per_page),
            page: self
                .page
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(1),
        }
        .clamped();

        Ok((
            RecipeFilter {
                q,
                tag_slugs,
                ingredient_id: self.ingredient_id,
                ingredient_slug,
                max_cook_time: to_i32(self.max_cook_time),
                source_type,
            },
            page,
        ))
    }
}

pub struct ListRecipesUseCase<R: RecipeRepository> {
    pub recipes: R,
}

impl<R: RecipeRepository> ListRecipesUseCase<R> {
    pub async fn execute(
        &self,
        tenant: Option<HouseholdId>,
        query: RecipeQuery,
    ) -> Result<Page<Recipe>, KitchenServiceError> {
        let (filter, page) = query.into_filter()?;
        self.recipes.list(tenant, &filter, page).await
    }
}
