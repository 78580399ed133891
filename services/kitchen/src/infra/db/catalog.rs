use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    IntoActiveModel as _, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use larder_core::sea_ext::lower_contains;
use larder_kitchen_schema::{ingredients, products};

use crate::domain::repository::{IngredientRepository, ProductRepository};
use crate::domain::types::{CatalogSearch, Ingredient, NewIngredient, NewProduct, Product};
use crate::error::KitchenServiceError;

// ── Ingredient repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbIngredientRepository {
    pub db: DatabaseConnection,
}

impl DbIngredientRepository {
    fn find_scoped(id: i64, include_deleted: bool) -> sea_orm::Select<ingredients::Entity> {
        let query = ingredients::Entity::find_by_id(id);
        if include_deleted {
            query
        } else {
            query.filter(ingredients::Column::DeletedAt.is_null())
        }
    }
}

impl IngredientRepository for DbIngredientRepository {
    async fn search(
        &self,
        search: &CatalogSearch,
    ) -> Result<Vec<Ingredient>, KitchenServiceError> {
        let mut query = ingredients::Entity::find();
        if !search.with_deleted {
            query = query.filter(ingredients::Column::DeletedAt.is_null());
        }
        if let Some(q) = &search.q {
            query = query.filter(
                Condition::any()
                    .add(lower_contains(
                        (ingredients::Entity, ingredients::Column::Name),
                        q,
                    ))
                    .add(lower_contains(
                        (ingredients::Entity, ingredients::Column::Slug),
                        q,
                    )),
            );
        }
        let models = query
            .order_by_asc(ingredients::Column::Name)
            .limit(search.limit)
            .all(&self.db)
            .await
            .context("search ingredients")?;
        Ok(models.into_iter().map(ingredient_from_model).collect())
    }

    async fn find_by_id(
        &self,
        id: i64,
        include_deleted: bool,
    ) -> Result<Option<Ingredient>, KitchenServiceError> {
        let model = Self::find_scoped(id, include_deleted)
            .one(&self.db)
            .await
            .context("find ingredient by id")?;
        Ok(model.map(ingredient_from_model))
    }

    async fn find_id_by_slug(
        &self,
        slug: &str,
        include_deleted: bool,
    ) -> Result<Option<i64>, KitchenServiceError> {
        let mut query = ingredients::Entity::find()
            .select_only()
            .column(ingredients::Column::Id)
            .filter(ingredients::Column::Slug.eq(slug));
        if !include_deleted {
            query = query.filter(ingredients::Column::DeletedAt.is_null());
        }
        let id = query
            .into_tuple::<i64>()
            .one(&self.db)
            .await
            .context("find ingredient id by slug")?;
        Ok(id)
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, KitchenServiceError> {
        let count = ingredients::Entity::find()
            .filter(ingredients::Column::Slug.eq(slug))
            .count(&self.db)
            .await
            .context("count ingredients by slug")?;
        Ok(count > 0)
    }

    async fn name_exists(&self, name: &str) -> Result<bool, KitchenServiceError> {
        let count = ingredients::Entity::find()
            .filter(ingredients::Column::Name.eq(name))
            .count(&self.db)
            .await
            .context("count ingredients by name")?;
        Ok(count > 0)
    }

    async fn create(&self, ingredient: &NewIngredient) -> Result<Ingredient, KitchenServiceError> {
        let now = Utc::now();
        let model = ingredients::ActiveModel {
            slug: Set(ingredient.slug.clone()),
            name: Set(ingredient.name.clone()),
            category: Set(ingredient.category.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("create ingredient")?;
        Ok(ingredient_from_model(model))
    }

    async fn set_deleted_at(
        &self,
        id: i64,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Ingredient>, KitchenServiceError> {
        let Some(model) = Self::find_scoped(id, true)
            .one(&self.db)
            .await
            .context("find ingredient for soft delete")?
        else {
            return Ok(None);
        };
        let mut am = model.into_active_model();
        am.deleted_at = Set(deleted_at);
        am.updated_at = Set(Utc::now());
        let model = am
            .update(&self.db)
            .await
            .context("update ingredient deleted_at")?;
        Ok(Some(ingredient_from_model(model)))
    }
}

fn ingredient_from_model(model: ingredients::Model) -> Ingredient {
    Ingredient {
        id: model.id,
        slug: model.slug,
        name: model.name,
        category: model.category,
        created_at: model.created_at,
        updated_at: model.updated_at,
        deleted_at: model.deleted_at,
    }
}

// ── Product repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbProductRepository {
    pub db: DatabaseConnection,
}

impl ProductRepository for DbProductRepository {
    async fn search(&self, search: &CatalogSearch) -> Result<Vec<Product>, KitchenServiceError> {
        let mut query = products::Entity::find().filter(products::Column::DeletedAt.is_null());
        if let Some(q) = &search.q {
            query = query.filter(
                Condition::any()
                    .add(lower_contains((products::Entity, products::Column::Name), q))
                    .add(lower_contains(
                        (products::Entity, products::Column::Company),
                        q,
                    )),
            );
        }
        let models = query
            .order_by_asc(products::Column::Name)
            .limit(search.limit)
            .all(&self.db)
            .await
            .context("search products")?;
        Ok(models.into_iter().map(product_from_model).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, KitchenServiceError> {
        let model = products::Entity::find_by_id(id)
            .filter(products::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .context("find product by id")?;
        Ok(model.map(product_from_model))
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, KitchenServiceError> {
        let count = products::Entity::find()
            .filter(products::Column::Slug.eq(slug))
            .count(&self.db)
            .await
            .context("count products by slug")?;
        Ok(count > 0)
    }

    async fn create(&self, product: &NewProduct) -> Result<Product, KitchenServiceError> {
        let now = Utc::now();
        let model = products::ActiveModel {
            slug: Set(product.slug.clone()),
            name: Set(product.name.clone()),
            company: Set(product.company.clone()),
            ingredient_id: Set(product.ingredient_id),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("create product")?;
        Ok(product_from_model(model))
    }
}

fn product_from_model(model: products::Model) -> Product {
    Product {
        id: model.id,
        slug: model.slug,
        name: model.name,
        company: model.company,
        ingredient_id: model.ingredient_id,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
