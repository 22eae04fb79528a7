//! Database connection pool.

use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::settings::Database;

pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Connect to Postgres and bring the schema up to date.
pub async fn connect(settings: &Database) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.url)
        .await?;

    MIGRATOR.run(&pool).await?;
    tracing::info!("database schema is up to date");

    Ok(pool)
}
