use std::collections::HashMap;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, DbErr, EntityTrait, IntoActiveModel as _, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionError, TransactionTrait,
    sea_query::{Expr, OnConflict, Query},
};

use larder_core::sea_ext::{ScopeToTenant as _, lower_contains};
use larder_domain::id::HouseholdId;
use larder_domain::pagination::{Page, PageRequest};
use larder_kitchen_schema::{
    ingredients, recipe_ingredients, recipe_steps, recipe_tags, recipes, tags,
};

use super::{from_decimal, to_decimal};
use crate::domain::repository::{RecipeRepository, TagRepository};
use crate::domain::types::{
    IngredientRef, Recipe, RecipeDraft, RecipeFilter, RecipeIngredientLine, RecipeStep,
    RecipeTarget, Tag, TagDraft,
};
use crate::error::KitchenServiceError;

// ── Recipe repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRecipeRepository {
    pub db: DatabaseConnection,
}

fn live_recipes(tenant: Option<HouseholdId>) -> sea_orm::Select<recipes::Entity> {
    recipes::Entity::find()
        .filter(recipes::Column::DeletedAt.is_null())
        .scope_to_tenant(recipes::Column::HouseholdId, tenant.map(|h| h.0))
}

impl RecipeRepository for DbRecipeRepository {
    async fn get(
        &self,
        tenant: Option<HouseholdId>,
        id: i64,
    ) -> Result<Option<Recipe>, KitchenServiceError> {
        let Some(model) = live_recipes(tenant)
            .filter(recipes::Column::Id.eq(id))
            .one(&self.db)
            .await
            .context("find recipe")?
        else {
            return Ok(None);
        };
        let mut recipes = hydrate(&self.db, vec![model]).await?;
        Ok(recipes.pop())
    }

    async fn list(
        &self,
        tenant: Option<HouseholdId>,
        filter: &RecipeFilter,
        page: PageRequest,
    ) -> Result<Page<Recipe>, KitchenServiceError> {
        let page = page.clamped();
        let query = apply_filter(live_recipes(tenant), filter);

        let total = query
            .clone()
            .count(&self.db)
            .await
            .context("count recipes")?;
        let models = query
            .order_by_asc(recipes::Column::Title)
            .order_by_asc(recipes::Column::Id)
            .offset(page.offset())
            .limit(u64::from(page.per_page))
            .all(&self.db)
            .await
            .context("list recipes")?;

        Ok(Page {
            items: hydrate(&self.db, models).await?,
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
        let draft = draft.clone();
        let result = self
            .db
            .transaction::<_, i64, DbErr>(move |txn| {
                Box::pin(async move {
                    let recipe_id = write_scalars(txn, tenant, target, &draft).await?;
                    replace_steps(txn, recipe_id, &draft).await?;
                    replace_ingredient_lines(txn, recipe_id, &draft).await?;
                    replace_tags(txn, recipe_id, &draft).await?;
                    Ok(recipe_id)
                })
            })
            .await;

        let recipe_id = match result {
            Ok(id) => id,
            Err(TransactionError::Transaction(DbErr::RecordNotFound(_))) => {
                return Err(KitchenServiceError::RecipeNotFound);
            }
            Err(e) => return Err(anyhow::Error::from(e).context("write recipe").into()),
        };

        self.get(tenant, recipe_id)
            .await?
            .context("recipe missing after write")
            .map_err(Into::into)
    }

    async fn soft_delete(
        &self,
        tenant: Option<HouseholdId>,
        id: i64,
    ) -> Result<bool, KitchenServiceError> {
        let now = Utc::now();
        let result = recipes::Entity::update_many()
            .col_expr(recipes::Column::DeletedAt, Expr::value(now))
            .col_expr(recipes::Column::UpdatedAt, Expr::value(now))
            .filter(recipes::Column::Id.eq(id))
            .filter(recipes::Column::DeletedAt.is_null())
            .scope_to_tenant(recipes::Column::HouseholdId, tenant.map(|h| h.0))
            .exec(&self.db)
            .await
            .context("soft delete recipe")?;
        Ok(result.rows_affected > 0)
    }
}

fn apply_filter(
    mut query: sea_orm::Select<recipes::Entity>,
    filter: &RecipeFilter,
) -> sea_orm::Select<recipes::Entity> {
    if let Some(q) = &filter.q {
        query = query.filter(
            Condition::any()
                .add(lower_contains((recipes::Entity, recipes::Column::Title), q))
                .add(lower_contains(
                    (recipes::Entity, recipes::Column::Description),
                    q,
                )),
        );
    }

    if !filter.tag_slugs.is_empty() {
        query = query.filter(
            recipes::Column::Id.in_subquery(
                Query::select()
                    .column((recipe_tags::Entity, recipe_tags::Column::RecipeId))
                    .from(recipe_tags::Entity)
                    .inner_join(
                        tags::Entity,
                        Expr::col((tags::Entity, tags::Column::Id))
                            .equals((recipe_tags::Entity, recipe_tags::Column::TagId)),
                    )
                    .and_where(
                        Expr::col((tags::Entity, tags::Column::Slug))
                            .is_in(filter.tag_slugs.iter().cloned()),
                    )
                    .to_owned(),
            ),
        );
    }

    if let Some(ingredient_id) = filter.ingredient_id {
        query = query.filter(
            recipes::Column::Id.in_subquery(
                Query::select()
                    .column(recipe_ingredients::Column::RecipeId)
                    .from(recipe_ingredients::Entity)
                    .and_where(
                        Expr::col(recipe_ingredients::Column::IngredientId).eq(ingredient_id),
                    )
                    .to_owned(),
            ),
        );
    }

    if let Some(slug) = &filter.ingredient_slug {
        query = query.filter(
            recipes::Column::Id.in_subquery(
                Query::select()
                    .column((recipe_ingredients::Entity, recipe_ingredients::Column::RecipeId))
                    .from(recipe_ingredients::Entity)
                    .inner_join(
                        ingredients::Entity,
                        Expr::col((ingredients::Entity, ingredients::Column::Id)).equals((
                            recipe_ingredients::Entity,
                            recipe_ingredients::Column::IngredientId,
                        )),
                    )
                    .and_where(
                        Expr::col((ingredients::Entity, ingredients::Column::Slug))
                            .eq(slug.as_str()),
                    )
                    .to_owned(),
            ),
        );
    }

    if let Some(max) = filter.max_cook_time {
        query = query.filter(recipes::Column::CookTimeMinutes.lte(max));
    }

    if let Some(source_type) = filter.source_type {
        query = query.filter(recipes::Column::SourceType.eq(source_type.as_str()));
    }

    query
}

// ── Aggregate writer ─────────────────────────────────────────────────────────

/// The live row a Replace may touch: same id, not deleted, inside the tenant.
fn replace_target(
    tenant: Option<HouseholdId>,
    recipe_id: i64,
) -> sea_orm::Select<recipes::Entity> {
    live_recipes(tenant).filter(recipes::Column::Id.eq(recipe_id))
}

/// Insert or update the recipe row and return its id. Replacing a recipe that is gone or
/// belongs to another tenant fails with `RecordNotFound`.
async fn write_scalars<C: ConnectionTrait>(
    conn: &C,
    tenant: Option<HouseholdId>,
    target: RecipeTarget,
    draft: &RecipeDraft,
) -> Result<i64, DbErr> {
    let now = Utc::now();
    let model = match target {
        RecipeTarget::Create {
            household_id,
            created_by_user_id,
        } => {
            let mut am = recipes::ActiveModel {
                household_id: Set(household_id.0),
                created_by_user_id: Set(created_by_user_id),
                created_at: Set(now),
                deleted_at: Set(None),
                ..Default::default()
            };
            set_fields(&mut am, draft, now);
            am.insert(conn).await?
        }
        RecipeTarget::Replace { recipe_id } => {
            let mut am = replace_target(tenant, recipe_id)
                .one(conn)
                .await?
                .ok_or_else(|| DbErr::RecordNotFound(format!("recipe {recipe_id}")))?
                .into_active_model();
            set_fields(&mut am, draft, now);
            am.update(conn).await?
        }
    };
    Ok(model.id)
}

fn set_fields(am: &mut recipes::ActiveModel, draft: &RecipeDraft, now: DateTime<Utc>) {
    let fields = &draft.fields;
    am.title = Set(fields.title.clone());
    am.description = Set(fields.description.clone());
    am.prep_time_minutes = Set(fields.prep_time_minutes);
    am.cook_time_minutes = Set(fields.cook_time_minutes);
    am.servings = Set(fields.servings);
    am.source_type = Set(fields.source_type.as_str().to_owned());
    am.source_url = Set(fields.source_url.clone());
    am.nutrition = Set(fields.nutrition.clone());
    am.updated_at = Set(now);
}

fn position(index: usize) -> Result<i32, DbErr> {
    i32::try_from(index + 1).map_err(|_| DbErr::Custom(format!("position {index} out of range")))
}

fn clear_steps(recipe_id: i64) -> sea_orm::DeleteMany<recipe_steps::Entity> {
    recipe_steps::Entity::delete_many().filter(recipe_steps::Column::RecipeId.eq(recipe_id))
}

fn clear_ingredient_lines(recipe_id: i64) -> sea_orm::DeleteMany<recipe_ingredients::Entity> {
    recipe_ingredients::Entity::delete_many()
        .filter(recipe_ingredients::Column::RecipeId.eq(recipe_id))
}

fn clear_tag_links(recipe_id: i64) -> sea_orm::DeleteMany<recipe_tags::Entity> {
    recipe_tags::Entity::delete_many().filter(recipe_tags::Column::RecipeId.eq(recipe_id))
}

/// Step rows numbered 1..N in draft order.
fn step_rows(
    recipe_id: i64,
    draft: &RecipeDraft,
    now: DateTime<Utc>,
) -> Result<Vec<recipe_steps::ActiveModel>, DbErr> {
    draft
        .steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            Ok(recipe_steps::ActiveModel {
                recipe_id: Set(recipe_id),
                position: Set(position(i)?),
                instruction: Set(step.instruction.clone()),
                timer_seconds: Set(step.timer_seconds),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            })
        })
        .collect()
}

/// Ingredient rows numbered 1..N in draft order.
fn ingredient_line_rows(
    recipe_id: i64,
    draft: &RecipeDraft,
    now: DateTime<Utc>,
) -> Result<Vec<recipe_ingredients::ActiveModel>, DbErr> {
    draft
        .ingredients
        .iter()
        .enumerate()
        .map(|(i, line)| {
            Ok(recipe_ingredients::ActiveModel {
                recipe_id: Set(recipe_id),
                position: Set(position(i)?),
                ingredient_id: Set(line.ingredient_id),
                ingredient_text: Set(line.ingredient_text.clone()),
                amount: Set(line.amount.map(to_decimal).transpose()?),
                unit: Set(line.unit.clone()),
                preparation_note: Set(line.preparation_note.clone()),
                is_optional: Set(line.is_optional),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            })
        })
        .collect()
}

/// Create the tag unless its slug exists. An existing slug keeps its original display name.
fn insert_tag(tag: &TagDraft, now: DateTime<Utc>) -> sea_orm::Insert<tags::ActiveModel> {
    tags::Entity::insert(tags::ActiveModel {
        slug: Set(tag.slug.clone()),
        name: Set(tag.name.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    })
    .on_conflict(OnConflict::column(tags::Column::Slug).do_nothing().to_owned())
}

/// One link per distinct tag id. `None` when there is nothing to link.
fn link_tags(
    recipe_id: i64,
    mut tag_ids: Vec<i64>,
) -> Option<sea_orm::Insert<recipe_tags::ActiveModel>> {
    tag_ids.sort_unstable();
    tag_ids.dedup();
    if tag_ids.is_empty() {
        return None;
    }
    let links = tag_ids.into_iter().map(|tag_id| recipe_tags::ActiveModel {
        recipe_id: Set(recipe_id),
        tag_id: Set(tag_id),
    });
    Some(
        recipe_tags::Entity::insert_many(links).on_conflict(
            OnConflict::columns([recipe_tags::Column::RecipeId, recipe_tags::Column::TagId])
                .do_nothing()
                .to_owned(),
        ),
    )
}

async fn replace_steps<C: ConnectionTrait>(
    conn: &C,
    recipe_id: i64,
    draft: &RecipeDraft,
) -> Result<(), DbErr> {
    clear_steps(recipe_id).exec(conn).await?;
    if draft.steps.is_empty() {
        return Ok(());
    }
    recipe_steps::Entity::insert_many(step_rows(recipe_id, draft, Utc::now())?)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

async fn replace_ingredient_lines<C: ConnectionTrait>(
    conn: &C,
    recipe_id: i64,
    draft: &RecipeDraft,
) -> Result<(), DbErr> {
    clear_ingredient_lines(recipe_id).exec(conn).await?;
    if draft.ingredients.is_empty() {
        return Ok(());
    }
    recipe_ingredients::Entity::insert_many(ingredient_line_rows(recipe_id, draft, Utc::now())?)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

/// Find-or-create every tag by slug, then relink the recipe to exactly that set.
async fn replace_tags<C: ConnectionTrait>(
    conn: &C,
    recipe_id: i64,
    draft: &RecipeDraft,
) -> Result<(), DbErr> {
    clear_tag_links(recipe_id).exec(conn).await?;
    if draft.tags.is_empty() {
        return Ok(());
    }

    let now = Utc::now();
    for tag in &draft.tags {
        insert_tag(tag, now).exec_without_returning(conn).await?;
    }

    let tag_ids: Vec<i64> = tags::Entity::find()
        .select_only()
        .column(tags::Column::Id)
        .filter(tags::Column::Slug.is_in(draft.tags.iter().map(|t| t.slug.clone())))
        .into_tuple()
        .all(conn)
        .await?;

    if let Some(insert) = link_tags(recipe_id, tag_ids) {
        insert.exec_without_returning(conn).await?;
    }
    Ok(())
}

// ── Aggregate reader ─────────────────────────────────────────────────────────

/// Load steps, ingredient lines and tags for a batch of recipes, keeping input order.
async fn hydrate(
    db: &DatabaseConnection,
    models: Vec<recipes::Model>,
) -> Result<Vec<Recipe>, KitchenServiceError> {
    if models.is_empty() {
        return Ok(vec![]);
    }
    let ids: Vec<i64> = models.iter().map(|m| m.id).collect();

    let steps = recipe_steps::Entity::find()
        .filter(recipe_steps::Column::RecipeId.is_in(ids.clone()))
        .order_by_asc(recipe_steps::Column::Position)
        .all(db)
        .await
        .context("load recipe steps")?;
    let mut steps_by_recipe: HashMap<i64, Vec<RecipeStep>> = HashMap::new();
    for step in steps {
        steps_by_recipe
            .entry(step.recipe_id)
            .or_default()
            .push(RecipeStep {
                id: step.id,
                position: step.position,
                instruction: step.instruction,
                timer_seconds: step.timer_seconds,
            });
    }

    let lines = recipe_ingredients::Entity::find()
        .find_also_related(ingredients::Entity)
        .filter(recipe_ingredients::Column::RecipeId.is_in(ids.clone()))
        .order_by_asc(recipe_ingredients::Column::Position)
        .all(db)
        .await
        .context("load recipe ingredients")?;
    let mut lines_by_recipe: HashMap<i64, Vec<RecipeIngredientLine>> = HashMap::new();
    for (line, ingredient) in lines {
        lines_by_recipe
            .entry(line.recipe_id)
            .or_default()
            .push(RecipeIngredientLine {
                id: line.id,
                position: line.position,
                ingredient: ingredient.map(|i| IngredientRef {
                    id: i.id,
                    name: i.name,
                    slug: i.slug,
                }),
                ingredient_text: line.ingredient_text,
                amount: line.amount.map(from_decimal),
                unit: line.unit,
                preparation_note: line.preparation_note,
                is_optional: line.is_optional,
            });
    }

    let links = recipe_tags::Entity::find()
        .find_also_related(tags::Entity)
        .filter(recipe_tags::Column::RecipeId.is_in(ids))
        .order_by_asc(tags::Column::Name)
        .all(db)
        .await
        .context("load recipe tags")?;
    let mut tags_by_recipe: HashMap<i64, Vec<Tag>> = HashMap::new();
    for (link, tag) in links {
        if let Some(tag) = tag {
            tags_by_recipe.entry(link.recipe_id).or_default().push(Tag {
                id: tag.id,
                slug: tag.slug,
                name: tag.name,
            });
        }
    }

    models
        .into_iter()
        .map(|model| {
            Ok(Recipe {
                id: model.id,
                household_id: HouseholdId(model.household_id),
                created_by_user_id: model.created_by_user_id,
                title: model.title,
                description: model.description,
                prep_time_minutes: model.prep_time_minutes,
                cook_time_minutes: model.cook_time_minutes,
                servings: model.servings,
                source_type: model.source_type.parse().context("recipe source type")?,
                source_url: model.source_url,
                nutrition: model.nutrition,
                steps: steps_by_recipe.remove(&model.id).unwrap_or_default(),
                ingredients: lines_by_recipe.remove(&model.id).unwrap_or_default(),
                tags: tags_by_recipe.remove(&model.id).unwrap_or_default(),
                created_at: model.created_at,
                updated_at: model.updated_at,
            })
        })
        .collect()
}

// ── Tag repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTagRepository {
    pub db: DatabaseConnection,
}

impl TagRepository for DbTagRepository {
    async fn search(&self, q: Option<&str>, limit: u64) -> Result<Vec<Tag>, KitchenServiceError> {
        let mut query = tags::Entity::find();
        if let Some(q) = q {
            query = query.filter(lower_contains((tags::Entity, tags::Column::Name), q));
        }
        let models = query
            .order_by_asc(tags::Column::Name)
            .limit(limit)
            .all(&self.db)
            .await
            .context("search tags")?;
        Ok(models
            .into_iter()
            .map(|model| Tag {
                id: model.id,
                slug: model.slug,
                name: model.name,
            })
            .collect())
    }
}
