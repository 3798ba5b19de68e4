use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("DATABASE_URL must be set for the postgres backend")]
    MissingUrl,

    #[error("Failed to connect to the database: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("Failed to run migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

pub async fn get_db_pool(config: &Config) -> Result<PgPool, PoolError> {
    let database_url = config.database_url.as_deref().ok_or(PoolError::MissingUrl)?;
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .min_connections(2)
        .idle_timeout(Duration::from_secs(30))
        .connect(database_url)
        .await?;

    if config.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("✅ Database migrations applied");
    }
    Ok(pool)
}
