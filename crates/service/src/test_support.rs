#![cfg(test)]
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use configs::DatabaseConfig;
use models::db::connect_with_config;

/// Fresh, migrated in-memory SQLite database. Each call is isolated from
/// every other test since the pool holds a single connection.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let db = connect_with_config(&DatabaseConfig::sqlite_memory()).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}
