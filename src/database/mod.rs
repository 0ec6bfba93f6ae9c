use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::OnceLock;

pub mod models;
pub mod repositories;
pub mod transaction;
pub mod utils;

static POOL: OnceLock<PgPool> = OnceLock::new();

pub async fn init_database(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    log::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("Migrations completed");

    let _ = POOL.set(pool.clone());
    Ok(pool)
}

/// Process-global pool handle for code that runs outside the actix data
/// graph (transaction helper). Panics if called before `init_database`.
pub fn get_pool_sync() -> PgPool {
    POOL.get()
        .expect("database pool accessed before init_database")
        .clone()
}
