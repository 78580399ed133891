use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use larder_domain::id::HouseholdId;
use larder_domain::pagination::{Page, PageRequest};

use larder_kitchen::domain::repository::{IngredientRepository, RecipeRepository};
use larder_kitchen::domain::types::{
    CatalogSearch, Ingredient, IngredientRef, NewIngredient, Recipe, RecipeDraft, RecipeFilter,
    RecipeIngredientLine, RecipeStep, RecipeTarget, Tag,
};
use larder_kitchen::error::KitchenServiceError;
use larder_kitchen::usecase::recipe::{IngredientLineInput, RecipeInput, StepInput};

// ── InMemoryKitchen ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct KitchenStore {
    pub ingredients: Vec<Ingredient>,
    /// Recipes with their soft-delete flag.
    pub recipes: Vec<(Recipe, bool)>,
    pub tags: Vec<Tag>,
    next_id: i64,
}

impl KitchenStore {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn ingredient_ref(&self, id: i64) -> Option<IngredientRef> {
        self.ingredients
            .iter()
            .find(|i| i.id == id)
            .map(|i| IngredientRef {
                id: i.id,
                name: i.name.clone(),
                slug: i.slug.clone(),
            })
    }
}

fn in_tenant(recipe: &Recipe, tenant: Option<HouseholdId>) -> bool {
    tenant.is_none_or(|t| recipe.household_id == t)
}

fn links(recipe: &Recipe, pred: impl Fn(&IngredientRef) -> bool) -> bool {
    recipe
        .ingredients
        .iter()
        .any(|line| line.ingredient.as_ref().is_some_and(&pred))
}

fn matches(recipe: &Recipe, filter: &RecipeFilter) -> bool {
    if let Some(q) = &filter.q {
        let in_title = recipe.title.to_lowercase().contains(q);
        let in_description = recipe
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(q));
        if !in_title && !in_description {
            return false;
        }
    }
    if !filter.tag_slugs.is_empty()
        && !recipe
            .tags
            .iter()
            .any(|t| filter.tag_slugs.contains(&t.slug))
    {
        return false;
    }
    if let Some(id) = filter.ingredient_id {
        if !links(recipe, |i| i.id == id) {
            return false;
        }
    }
    if let Some(slug) = &filter.ingredient_slug {
        if !links(recipe, |i| &i.slug == slug) {
            return false;
        }
    }
    if let Some(max) = filter.max_cook_time {
        if !recipe.cook_time_minutes.is_some_and(|c| c <= max) {
            return false;
        }
    }
    if let Some(source_type) = filter.source_type {
        if recipe.source_type != source_type {
            return false;
        }
    }
    true
}

/// Recipe writer and ingredient catalog backed by one shared in-memory store.
#[derive(Clone, Default)]
pub struct InMemoryKitchen {
    pub store: Arc<Mutex<KitchenStore>>,
}

impl InMemoryKitchen {
    pub fn add_ingredient(&self, name: &str, slug: &str, deleted_at: Option<DateTime<Utc>>) -> i64 {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        store.ingredients.push(Ingredient {
            id,
            slug: slug.to_owned(),
            name: name.to_owned(),
            category: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at,
        });
        id
    }

    pub fn stored_recipe(&self, id: i64) -> Option<Recipe> {
        self.store
            .lock()
            .unwrap()
            .recipes
            .iter()
            .find(|(r, _)| r.id == id)
            .map(|(r, _)| r.clone())
    }

    pub fn tag_count(&self) -> usize {
        self.store.lock().unwrap().tags.len()
    }
}

impl IngredientRepository for InMemoryKitchen {
    async fn search(
        &self,
        search: &CatalogSearch,
    ) -> Result<Vec<Ingredient>, KitchenServiceError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .ingredients
            .iter()
            .filter(|i| search.with_deleted || i.deleted_at.is_none())
            .filter(|i| search.q.as_ref().is_none_or(|q| i.name.contains(q)))
            .take(search.limit as usize)
            .cloned()
            .collect())
    }

    async fn find_by_id(
        &self,
        id: i64,
        include_deleted: bool,
    ) -> Result<Option<Ingredient>, KitchenServiceError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .ingredients
            .iter()
            .find(|i| i.id == id && (include_deleted || i.deleted_at.is_none()))
            .cloned())
    }

    async fn find_id_by_slug(
        &self,
        slug: &str,
        include_deleted: bool,
    ) -> Result<Option<i64>, KitchenServiceError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .ingredients
            .iter()
            .find(|i| i.slug == slug && (include_deleted || i.deleted_at.is_none()))
            .map(|i| i.id))
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, KitchenServiceError> {
        let store = self.store.lock().unwrap();
        Ok(store.ingredients.iter().any(|i| i.slug == slug))
    }

    async fn name_exists(&self, name: &str) -> Result<bool, KitchenServiceError> {
        let store = self.store.lock().unwrap();
        Ok(store.ingredients.iter().any(|i| i.name == name))
    }

    async fn create(&self, ingredient: &NewIngredient) -> Result<Ingredient, KitchenServiceError> {
        let id = self.add_ingredient(&ingredient.name, &ingredient.slug, None);
        let store = self.store.lock().unwrap();
        Ok(store.ingredients.iter().find(|i| i.id == id).cloned().unwrap())
    }

    async fn set_deleted_at(
        &self,
        id: i64,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Ingredient>, KitchenServiceError> {
        let mut store = self.store.lock().unwrap();
        Ok(store
            .ingredients
            .iter_mut()
            .find(|i| i.id == id)
            .map(|i| {
                i.deleted_at = deleted_at;
                i.clone()
            }))
    }
}

impl RecipeRepository for InMemoryKitchen {
    async fn get(
        &self,
        tenant: Option<HouseholdId>,
        id: i64,
    ) -> Result<Option<Recipe>, KitchenServiceError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .recipes
            .iter()
            .find(|(r, deleted)| r.id == id && !deleted && in_tenant(r, tenant))
            .map(|(r, _)| r.clone()))
    }

    async fn list(
        &self,
        tenant: Option<HouseholdId>,
        filter: &RecipeFilter,
        page: PageRequest,
    ) -> Result<Page<Recipe>, KitchenServiceError> {
        let store = self.store.lock().unwrap();
        let mut found: Vec<Recipe> = store
            .recipes
            .iter()
            .filter(|(r, deleted)| !deleted && in_tenant(r, tenant) && matches(r, filter))
            .map(|(r, _)| r.clone())
            .collect();
        found.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        let total = found.len() as u64;
        let items = found
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.per_page as usize)
            .collect();
        Ok(Page {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    async fn write(
        &self,
        tenant: Option<HouseholdId>,
        target: RecipeTarget,
        draft: &RecipeDraft,
    ) -> Result<Recipe, KitchenServiceError> {
        let mut store = self.store.lock().unwrap();

        let (id, household_id, created_by_user_id, created_at) = match target {
            RecipeTarget::Create {
                household_id,
                created_by_user_id,
            } => (store.next_id(), household_id, created_by_user_id, Utc::now()),
            RecipeTarget::Replace { recipe_id } => {
                let (existing, _) = store
                    .recipes
                    .iter()
                    .find(|(r, deleted)| r.id == recipe_id && !deleted && in_tenant(r, tenant))
                    .ok_or(KitchenServiceError::RecipeNotFound)?;
                (
                    existing.id,
                    existing.household_id,
                    existing.created_by_user_id,
                    existing.created_at,
                )
            }
        };

        let mut steps = Vec::with_capacity(draft.steps.len());
        for (i, step) in draft.steps.iter().enumerate() {
            steps.push(RecipeStep {
                id: store.next_id(),
                position: i as i32 + 1,
                instruction: step.instruction.clone(),
                timer_seconds: step.timer_seconds,
            });
        }

        let mut ingredients = Vec::with_capacity(draft.ingredients.len());
        for (i, line) in draft.ingredients.iter().enumerate() {
            let ingredient = line.ingredient_id.and_then(|id| store.ingredient_ref(id));
            ingredients.push(RecipeIngredientLine {
                id: store.next_id(),
                position: i as i32 + 1,
                ingredient,
                ingredient_text: line.ingredient_text.clone(),
                amount: line.amount,
                unit: line.unit.clone(),
                preparation_note: line.preparation_note.clone(),
                is_optional: line.is_optional,
            });
        }

        let mut tags = Vec::with_capacity(draft.tags.len());
        for tag in &draft.tags {
            let existing = store.tags.iter().find(|t| t.slug == tag.slug).cloned();
            let tag = match existing {
                Some(existing) => existing,
                None => {
                    let created = Tag {
                        id: store.next_id(),
                        slug: tag.slug.clone(),
                        name: tag.name.clone(),
                    };
                    store.tags.push(created.clone());
                    created
                }
            };
            tags.push(tag);
        }
        tags.sort_by(|a, b| a.name.cmp(&b.name));

        let fields = &draft.fields;
        let recipe = Recipe {
            id,
            household_id,
            created_by_user_id,
            title: fields.title.clone(),
            description: fields.description.clone(),
            prep_time_minutes: fields.prep_time_minutes,
            cook_time_minutes: fields.cook_time_minutes,
            servings: fields.servings,
            source_type: fields.source_type,
            source_url: fields.source_url.clone(),
            nutrition: fields.nutrition.clone(),
            steps,
            ingredients,
            tags,
            created_at,
            updated_at: Utc::now(),
        };

        store.recipes.retain(|(r, _)| r.id != id);
        store.recipes.push((recipe.clone(), false));
        Ok(recipe)
    }

    async fn soft_delete(
        &self,
        tenant: Option<HouseholdId>,
        id: i64,
    ) -> Result<bool, KitchenServiceError> {
        let mut store = self.store.lock().unwrap();
        match store
            .recipes
            .iter_mut()
            .find(|(r, deleted)| r.id == id && !*deleted && in_tenant(r, tenant))
        {
            Some((_, deleted)) => {
                *deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ── Payload builders ─────────────────────────────────────────────────────────

pub fn step(instruction: &str) -> StepInput {
    StepInput {
        instruction: instruction.to_owned(),
        timer_seconds: None,
    }
}

pub fn slug_line(slug: &str, amount: f64, unit: &str) -> IngredientLineInput {
    IngredientLineInput {
        ingredient_slug: Some(slug.to_owned()),
        amount: Some(amount),
        unit: Some(unit.to_owned()),
        ..Default::default()
    }
}

pub fn text_line(text: &str) -> IngredientLineInput {
    IngredientLineInput {
        ingredient_text: Some(text.to_owned()),
        ..Default::default()
    }
}

pub fn recipe_input(title: &str, tags: &[&str]) -> RecipeInput {
    RecipeInput {
        title: title.to_owned(),
        steps: vec![step("Prepare everything")],
        ingredients: vec![text_line("water")],
        tags: tags.iter().map(|t| (*t).to_owned()).collect(),
        ..Default::default()
    }
}
