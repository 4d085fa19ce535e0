use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use super::PostgresConfig;
use crate::DatabaseError;
use crate::retry::{Backoff, retry_with_backoff};

/// Open a pooled connection using the settings in `config`.
pub async fn connect_from_config(config: PostgresConfig) -> Result<DatabaseConnection, DbErr> {
    let max_connections = config.max_connections;
    let db = Database::connect(config.into_connect_options()).await?;
    info!(max_connections, "Connected to PostgreSQL");
    Ok(db)
}

/// Like [`connect_from_config`], retrying with backoff while the database comes up.
///
/// `None` uses [`Backoff::default`].
pub async fn connect_from_config_with_retry(
    config: PostgresConfig,
    backoff: Option<Backoff>,
) -> Result<DatabaseConnection, DatabaseError> {
    let backoff = backoff.unwrap_or_default();

    retry_with_backoff(|| connect_from_config(config.clone()), &backoff)
        .await
        .map_err(|(attempts, source)| DatabaseError::ConnectionFailed { attempts, source })
}

/// Apply all pending migrations of `M`.
///
/// `app_name` only labels the log lines.
pub async fn run_migrations<M: MigratorTrait>(
    db: &DatabaseConnection,
    app_name: &str,
) -> Result<(), DatabaseError> {
    info!(app = app_name, "Running database migrations");
    M::up(db, None)
        .await
        .map_err(DatabaseError::Migration)?;
    info!(app = app_name, "Migrations completed");
    Ok(())
}
