use chrono::Utc;

use larder_domain::id::HouseholdId;
use larder_domain::recipe::SourceType;

use larder_kitchen::error::KitchenServiceError;
use larder_kitchen::usecase::recipe::{
    CreateRecipeUseCase, DeleteRecipeUseCase, GetRecipeUseCase, ListRecipesUseCase, RecipeInput,
    RecipeQuery, UpdateRecipeUseCase,
};

use crate::helpers::{InMemoryKitchen, recipe_input, slug_line, step, text_line};

const H1: HouseholdId = HouseholdId(101);
const H2: HouseholdId = HouseholdId(202);
const U1: i64 = 7;

fn create(kitchen: &InMemoryKitchen) -> CreateRecipeUseCase<InMemoryKitchen, InMemoryKitchen> {
    CreateRecipeUseCase {
        recipes: kitchen.clone(),
        ingredients: kitchen.clone(),
    }
}

fn update(kitchen: &InMemoryKitchen) -> UpdateRecipeUseCase<InMemoryKitchen, InMemoryKitchen> {
    UpdateRecipeUseCase {
        recipes: kitchen.clone(),
        ingredients: kitchen.clone(),
    }
}

fn list(kitchen: &InMemoryKitchen) -> ListRecipesUseCase<InMemoryKitchen> {
    ListRecipesUseCase {
        recipes: kitchen.clone(),
    }
}

fn titles(
    page: &larder_domain::pagination::Page<larder_kitchen::domain::types::Recipe>,
) -> Vec<&str> {
    page.items.iter().map(|r| r.title.as_str()).collect()
}

// ── Tenancy isolation ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_keep_recipes_inside_their_household() {
    let kitchen = InMemoryKitchen::default();
    let recipe = create(&kitchen)
        .execute(Some(H1), U1, recipe_input("Pancakes", &[]))
        .await
        .unwrap();
    assert_eq!(recipe.household_id, H1);

    let from_other = GetRecipeUseCase {
        recipes: kitchen.clone(),
    }
    .execute(Some(H2), recipe.id)
    .await;
    assert!(matches!(from_other, Err(KitchenServiceError::RecipeNotFound)));

    let page = list(&kitchen)
        .execute(Some(H2), RecipeQuery::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
    assert!(page.items.is_empty());

    let updated = update(&kitchen)
        .execute(Some(H2), recipe.id, recipe_input("Stolen", &[]))
        .await;
    assert!(matches!(updated, Err(KitchenServiceError::RecipeNotFound)));

    let deleted = DeleteRecipeUseCase {
        recipes: kitchen.clone(),
    }
    .execute(Some(H2), recipe.id)
    .await;
    assert!(matches!(deleted, Err(KitchenServiceError::RecipeNotFound)));

    assert_eq!(kitchen.stored_recipe(recipe.id).unwrap().title, "Pancakes");
}

#[tokio::test]
async fn should_hide_soft_deleted_recipes() {
    let kitchen = InMemoryKitchen::default();
    let recipe = create(&kitchen)
        .execute(Some(H1), U1, recipe_input("Porridge", &[]))
        .await
        .unwrap();

    let delete = DeleteRecipeUseCase {
        recipes: kitchen.clone(),
    };
    delete.execute(Some(H1), recipe.id).await.unwrap();

    let again = delete.execute(Some(H1), recipe.id).await;
    assert!(matches!(again, Err(KitchenServiceError::RecipeNotFound)));
    let page = list(&kitchen)
        .execute(Some(H1), RecipeQuery::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

// ── Replace semantics ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_replace_children_with_dense_positions() {
    let kitchen = InMemoryKitchen::default();
    let mut input = recipe_input("Stew", &["Dinner"]);
    input.steps = vec![step("Brown the meat"), step("Add stock"), step("Simmer")];
    input.ingredients = vec![text_line("beef"), text_line("stock"), text_line("carrots")];
    let recipe = create(&kitchen).execute(Some(H1), U1, input).await.unwrap();
    let old_step_ids: Vec<i64> = recipe.steps.iter().map(|s| s.id).collect();

    let mut input = recipe_input("Stew", &["Winter"]);
    input.steps = vec![step("Simmer everything"), step("Serve")];
    input.ingredients = vec![text_line("lentils")];
    let updated = update(&kitchen)
        .execute(Some(H1), recipe.id, input)
        .await
        .unwrap();

    let positions: Vec<i32> = updated.steps.iter().map(|s| s.position).collect();
    assert_eq!(positions, vec![1, 2]);
    assert_eq!(updated.steps[0].instruction, "Simmer everything");
    assert!(updated.steps.iter().all(|s| !old_step_ids.contains(&s.id)));
    assert_eq!(updated.ingredients.len(), 1);
    assert_eq!(updated.ingredients[0].position, 1);
    assert_eq!(updated.ingredients[0].ingredient_text.as_deref(), Some("lentils"));
    let tags: Vec<&str> = updated.tags.iter().map(|t| t.slug.as_str()).collect();
    assert_eq!(tags, vec!["winter"]);
}

#[tokio::test]
async fn should_reject_empty_ingredient_row_and_keep_previous_lines() {
    let kitchen = InMemoryKitchen::default();
    let mut input = recipe_input("Salad", &[]);
    input.ingredients = vec![text_line("lettuce"), text_line("tomato")];
    let recipe = create(&kitchen).execute(Some(H1), U1, input).await.unwrap();

    let mut input = recipe_input("Salad", &[]);
    input.ingredients = vec![text_line("cucumber"), Default::default()];
    let result = update(&kitchen).execute(Some(H1), recipe.id, input).await;

    match result {
        Err(KitchenServiceError::Validation(errors)) => {
            assert!(errors.get("ingredients.1").is_some());
            assert!(errors.get("ingredients.0").is_none());
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    let stored = kitchen.stored_recipe(recipe.id).unwrap();
    let texts: Vec<_> = stored
        .ingredients
        .iter()
        .map(|l| l.ingredient_text.as_deref().unwrap())
        .collect();
    assert_eq!(texts, vec!["lettuce", "tomato"]);
}

// ── Tags ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_link_case_variants_to_one_tag() {
    let kitchen = InMemoryKitchen::default();
    let first = create(&kitchen)
        .execute(Some(H1), U1, recipe_input("Toast", &["Quick", "quick"]))
        .await
        .unwrap();
    assert_eq!(first.tags.len(), 1);
    assert_eq!(first.tags[0].name, "Quick");

    let second = create(&kitchen)
        .execute(Some(H2), U1, recipe_input("Eggs", &["QUICK"]))
        .await
        .unwrap();
    assert_eq!(second.tags[0].id, first.tags[0].id);
    assert_eq!(kitchen.tag_count(), 1);
}

#[tokio::test]
async fn should_match_any_of_the_requested_tags() {
    let kitchen = InMemoryKitchen::default();
    let usecase = create(&kitchen);
    for (title, tags) in [
        ("Curry", &["Dinner"][..]),
        ("Omelette", &["Quick"][..]),
        ("Roast", &["Sunday"][..]),
        ("Fried rice", &["Dinner", "Quick"][..]),
    ] {
        usecase
            .execute(Some(H1), U1, recipe_input(title, tags))
            .await
            .unwrap();
    }

    let query = RecipeQuery {
        tags: vec!["dinner".into(), "Quick".into()],
        ..Default::default()
    };
    let page = list(&kitchen).execute(Some(H1), query).await.unwrap();
    assert_eq!(titles(&page), vec!["Curry", "Fried rice", "Omelette"]);
    assert_eq!(page.total, 3);
}

// ── Listing ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_combine_filters_and_paginate() {
    let kitchen = InMemoryKitchen::default();
    let salt = kitchen.add_ingredient("salt", "salt", None);
    let usecase = create(&kitchen);

    for (title, cook, salted) in [
        ("Chips", 20, true),
        ("Broth", 90, true),
        ("Crisps", 10, true),
        ("Jelly", 5, false),
    ] {
        let mut input = recipe_input(title, &[]);
        input.cook_time_minutes = Some(cook);
        if salted {
            input.ingredients = vec![slug_line("salt", 1.0, "tsp")];
        }
        usecase.execute(Some(H1), U1, input).await.unwrap();
    }

    let query = RecipeQuery {
        ingredient_id: Some(salt),
        max_cook_time: Some(30),
        per_page: Some(1),
        page: Some(2),
        ..Default::default()
    };
    let page = list(&kitchen).execute(Some(H1), query).await.unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.per_page, 1);
    assert_eq!(titles(&page), vec!["Crisps"]);

    let query = RecipeQuery {
        ingredient_slug: Some("salt".into()),
        q: Some("BRO".into()),
        ..Default::default()
    };
    let page = list(&kitchen).execute(Some(H1), query).await.unwrap();
    assert_eq!(titles(&page), vec!["Broth"]);

    let query = RecipeQuery {
        source_type: Some("site_import".into()),
        ..Default::default()
    };
    let page = list(&kitchen).execute(Some(H1), query).await.unwrap();
    assert_eq!(page.total, 0);
}

// ── End to end ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_round_trip_full_recipe_aggregate() {
    let kitchen = InMemoryKitchen::default();
    let salt = kitchen.add_ingredient("salt", "salt", None);
    kitchen.add_ingredient("msg", "msg", Some(Utc::now()));

    let input = RecipeInput {
        title: "Roast potatoes".into(),
        description: Some("Crispy outside".into()),
        cook_time_minutes: Some(45),
        servings: Some(4),
        steps: vec![step("Parboil"), step("Roast")],
        ingredients: vec![
            slug_line("salt", 1.5, "tsp"),
            slug_line("msg", 0.5, "tsp"),
            slug_line("truffle-dust", 1.0, "pinch"),
            text_line("potatoes"),
        ],
        tags: vec!["Quick".into(), "Dinner".into()],
        ..Default::default()
    };
    let recipe = create(&kitchen).execute(Some(H1), U1, input).await.unwrap();

    assert_eq!(recipe.household_id, H1);
    assert_eq!(recipe.created_by_user_id, U1);
    assert_eq!(recipe.source_type, SourceType::Manual);
    let steps: Vec<_> = recipe
        .steps
        .iter()
        .map(|s| (s.position, s.instruction.as_str()))
        .collect();
    assert_eq!(steps, vec![(1, "Parboil"), (2, "Roast")]);

    let first = &recipe.ingredients[0];
    let linked = first.ingredient.as_ref().unwrap();
    assert_eq!((linked.id, linked.name.as_str()), (salt, "salt"));
    assert_eq!(first.amount, Some(1.5));
    // Soft-deleted catalog entries still link.
    assert_eq!(recipe.ingredients[1].ingredient.as_ref().unwrap().slug, "msg");
    // Unknown slugs keep the row unlinked.
    assert!(recipe.ingredients[2].ingredient.is_none());
    assert_eq!(recipe.ingredients[2].unit.as_deref(), Some("pinch"));

    let tag_names: Vec<_> = recipe.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tag_names, vec!["Dinner", "Quick"]);

    let mut input = recipe_input("Roast potatoes", &[]);
    input.ingredients = vec![];
    let result = update(&kitchen).execute(Some(H1), recipe.id, input).await;
    assert!(matches!(result, Err(KitchenServiceError::Validation(_))));

    let fetched = GetRecipeUseCase {
        recipes: kitchen.clone(),
    }
    .execute(Some(H1), recipe.id)
    .await
    .unwrap();
    assert_eq!(fetched.ingredients.len(), 4);
    assert_eq!(fetched.tags.len(), 2);
}
