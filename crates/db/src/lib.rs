//! Credential store: the `users` table and the [`UserStore`] seam the auth
//! workflow talks to.

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

pub mod memory;
pub mod models;
pub mod repositories;
pub mod store;

pub use store::{PgUserStore, StoreError, UserStore};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from parsed connection options.
pub async fn create_pool(
    options: PgConnectOptions,
    max_connections: u32,
) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations under `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
