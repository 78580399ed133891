use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware,
    routing::{delete, get, patch, post},
};
use tower::ServiceBuilder;

use larder_core::health::{database_readiness, healthz};
use larder_core::middleware::{http_trace_layer, propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    catalog::{
        create_ingredient, create_product, delete_ingredient, list_ingredients, list_products,
        restore_ingredient,
    },
    household::{
        create_household, delete_household, get_management, get_my_households,
        set_active_household, set_open_membership, update_household,
    },
    inventory::{
        create_inventory_item, delete_inventory_item, get_inventory_item, inventory_metadata,
        list_inventory, update_inventory_item,
    },
    invite::{redeem_invite, revoke_invite, send_invite},
    membership::{
        approve_membership, list_join_requests, reject_membership, remove_member, request_join,
    },
    recipe::{create_recipe, delete_recipe, get_recipe, list_recipes, update_recipe},
    tag::search_tags,
    user::{create_user, get_me},
};
use crate::state::AppState;
use crate::tenancy::resolve_household_context;

async fn readyz(State(state): State<AppState>) -> StatusCode {
    database_readiness(&state.db).await
}

pub fn build_router(state: AppState) -> Router {
    // Tenant-owned resources resolve the household context before the handler runs.
    let tenant_routes = Router::new()
        // Recipes
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/recipes/{id}",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
        // Inventory
        .route(
            "/inventory-items",
            get(list_inventory).post(create_inventory_item),
        )
        .route("/inventory-items/metadata", get(inventory_metadata))
        .route(
            "/inventory-items/{id}",
            get(get_inventory_item)
                .put(update_inventory_item)
                .delete(delete_inventory_item),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            resolve_household_context,
        ));

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Users
        .route("/users", post(create_user))
        .route("/users/@me", get(get_me))
        // Households
        .route("/households/my", get(get_my_households))
        .route("/households", post(create_household))
        .route("/households/active", post(set_active_household))
        .route("/households/join-requests", post(request_join))
        .route(
            "/households/{id}",
            patch(update_household).delete(delete_household),
        )
        .route("/households/{id}/management", get(get_management))
        .route("/households/{id}/open-membership", patch(set_open_membership))
        .route("/households/{id}/join-requests", get(list_join_requests))
        // Memberships
        .route("/household-memberships/{id}/approve", post(approve_membership))
        .route("/household-memberships/{id}/reject", post(reject_membership))
        .route("/household-memberships/{id}", delete(remove_member))
        // Invites
        .route("/households/{id}/accesses", post(send_invite))
        .route("/household-accesses/{id}", delete(revoke_invite))
        .route("/household-access/redeem", post(redeem_invite))
        // Catalog
        .route("/tags", get(search_tags))
        .route("/ingredients", get(list_ingredients).post(create_ingredient))
        .route("/ingredients/{id}", delete(delete_ingredient))
        .route("/ingredients/{id}/restore", post(restore_ingredient))
        .route("/products", get(list_products).post(create_product))
        .merge(tenant_routes)
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(http_trace_layer())
                .layer(propagate_request_id_layer()),
        )
        .with_state(state)
}
