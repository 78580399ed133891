use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(larder_kitchen_migration::Migrator).await;
}
