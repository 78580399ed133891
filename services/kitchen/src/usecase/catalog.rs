use chrono::Utc;

use larder_domain::slug::next_unique_slug;

use crate::domain::repository::{IngredientRepository, ProductRepository};
use crate::domain::types::{
    CatalogSearch, INGREDIENT_SLUG_FALLBACK, Ingredient, NewIngredient, NewProduct,
    PRODUCT_SLUG_FALLBACK, Product,
};
use crate::domain::validation::{
    ValidationErrors, check_max_len, check_range, check_required, non_blank,
};
use crate::error::KitchenServiceError;

pub const DEFAULT_CATALOG_LIMIT: u64 = 50;

/// Validate and normalize `q`/`limit` query parameters shared by catalog searches.
pub fn catalog_search(
    q: Option<&str>,
    limit: Option<u64>,
    default_limit: u64,
    with_deleted: bool,
) -> Result<CatalogSearch, KitchenServiceError> {
    let q = non_blank(q).map(str::to_lowercase);
    let mut errors = ValidationErrors::new();
    check_max_len(&mut errors, "q", q.as_deref(), 100);
    check_range(&mut errors, "limit", limit, 1, 100);
    errors.into_result()?;
    Ok(CatalogSearch {
        q,
        limit: limit.unwrap_or(default_limit),
        with_deleted,
    })
}

// ── Ingredients ──────────────────────────────────────────────────────────────

pub struct ListIngredientsUseCase<R: IngredientRepository> {
    pub repo: R,
}

impl<R: IngredientRepository> ListIngredientsUseCase<R> {
    pub async fn execute(
        &self,
        search: CatalogSearch,
    ) -> Result<Vec<Ingredient>, KitchenServiceError> {
        self.repo.search(&search).await
    }
}

pub struct CreateIngredientInput {
    pub name: String,
    pub category: Option<String>,
}

pub struct CreateIngredientUseCase<R: IngredientRepository> {
    pub repo: R,
}

impl<R: IngredientRepository> CreateIngredientUseCase<R> {
    pub async fn execute(
        &self,
        input: CreateIngredientInput,
    ) -> Result<Ingredient, KitchenServiceError> {
        let name = input.name.trim().to_lowercase();
        let category = non_blank(input.category.as_deref()).map(str::to_owned);

        let mut errors = ValidationErrors::new();
        check_required(&mut errors, "name", &name, 255);
        check_max_len(&mut errors, "category", category.as_deref(), 100);
        errors.into_result()?;

        if self.repo.name_exists(&name).await? {
            return Err(ValidationErrors::single("name", "name has already been taken"));
        }

        let slug = next_unique_slug(&name, INGREDIENT_SLUG_FALLBACK, |candidate| async move {
            self.repo.slug_exists(&candidate).await
        })
        .await?;

        self.repo
            .create(&NewIngredient {
                slug,
                name,
                category,
            })
            .await
    }
}

pub struct DeleteIngredientUseCase<R: IngredientRepository> {
    pub repo: R,
}

impl<R: IngredientRepository> DeleteIngredientUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<(), KitchenServiceError> {
        if self.repo.find_by_id(id, false).await?.is_none() {
            return Err(KitchenServiceError::IngredientNotFound);
        }
        self.repo
            .set_deleted_at(id, Some(Utc::now()))
            .await?
            .ok_or(KitchenServiceError::IngredientNotFound)?;
        Ok(())
    }
}

pub struct RestoreIngredientUseCase<R: IngredientRepository> {
    pub repo: R,
}

impl<R: IngredientRepository> RestoreIngredientUseCase<R> {
    /// Restoring an active ingredient returns it unchanged.
    pub async fn execute(&self, id: i64) -> Result<Ingredient, KitchenServiceError> {
        let ingredient = self
            .repo
            .find_by_id(id, true)
            .await?
            .ok_or(KitchenServiceError::IngredientNotFound)?;
        if ingredient.deleted_at.is_none() {
            return Ok(ingredient);
        }
        self.repo
            .set_deleted_at(id, None)
            .await?
            .ok_or(KitchenServiceError::IngredientNotFound)
    }
}

// ── Products ─────────────────────────────────────────────────────────────────

pub struct ListProductsUseCase<P: ProductRepository> {
    pub repo: P,
}

impl<P: ProductRepository> ListProductsUseCase<P> {
    pub async fn execute(
        &self,
        search: CatalogSearch,
    ) -> Result<Vec<Product>, KitchenServiceError> {
        self.repo.search(&search).await
    }
}

pub struct CreateProductInput {
    pub name: String,
    pub company: Option<String>,
    pub ingredient_id: Option<i64>,
}

pub struct CreateProductUseCase<P, I>
where
    P: ProductRepository,
    I: IngredientRepository,
{
    pub products: P,
    pub ingredients: I,
}

impl<P, I> CreateProductUseCase<P, I>
where
    P: ProductRepository,
    I: IngredientRepository,
{
    pub async fn execute(&self, input: CreateProductInput) -> Result<Product, KitchenServiceError> {
        let name = input.name.trim().to_owned();
        let company = non_blank(input.company.as_deref()).map(str::to_owned);

        let mut errors = ValidationErrors::new();
        check_required(&mut errors, "name", &name, 255);
        check_max_len(&mut errors, "company", company.as_deref(), 255);
        if let Some(ingredient_id) = input.ingredient_id {
            if self.ingredients.find_by_id(ingredient_id, false).await?.is_none() {
                errors.add("ingredient_id", "the selected ingredient_id is invalid");
            }
        }
        errors.into_result()?;

        let slug = next_unique_slug(&name, PRODUCT_SLUG_FALLBACK, |candidate| async move {
            self.products.slug_exists(&candidate).await
        })
        .await?;

        self.products
            .create(&NewProduct {
                slug,
                name,
                company,
                ingredient_id: input.ingredient_id,
            })
            .await
    }
}
