use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use super::PostgresConfig;
use crate::error::DatabaseResult;
use crate::retry::{RetryConfig, retry_with_backoff};

pub async fn connect(config: &PostgresConfig) -> DatabaseResult<DatabaseConnection> {
    let db = Database::connect(config.connect_options()).await?;
    info!(
        max_connections = config.max_connections,
        "Connected to PostgreSQL"
    );
    Ok(db)
}

/// Connect, retrying with exponential backoff while the database comes up.
pub async fn connect_with_retry(
    config: &PostgresConfig,
    retry: RetryConfig,
) -> DatabaseResult<DatabaseConnection> {
    retry_with_backoff(|| connect(config), retry).await
}

/// Apply all pending migrations of `M`.
pub async fn run_migrations<M: MigratorTrait>(
    db: &DatabaseConnection,
    app_name: &str,
) -> DatabaseResult<()> {
    info!(app = app_name, "Running database migrations");
    M::up(db, None).await?;
    info!(app = app_name, "Migrations applied");
    Ok(())
}
