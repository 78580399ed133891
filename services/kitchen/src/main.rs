use sea_orm::Database;
use tracing::info;

use larder_core::tracing::init_tracing;
use larder_kitchen::config::KitchenConfig;
use larder_kitchen::router::build_router;
use larder_kitchen::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing("info,sqlx=warn");

    let config = KitchenConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let state = AppState {
        db,
        cookie_domain: config.cookie_domain,
        invite_ttl_days: config.invite_ttl_days,
    };

    let router = build_router(state);
    let http_addr = format!("0.0.0.0:{}", config.kitchen_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!("kitchen service listening on {http_addr}");
    axum::serve(listener, router).await.expect("server error");
}
