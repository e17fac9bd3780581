use std::time::Duration;

use configs::DatabaseConfig;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use tracing::info;

use crate::errors::ModelError;

pub fn connect_options(cfg: &DatabaseConfig) -> ConnectOptions {
    let mut opts = ConnectOptions::new(cfg.url.clone());
    opts.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs))
        .sqlx_logging(cfg.sqlx_logging);
    opts
}

pub async fn connect_with_config(cfg: &DatabaseConfig) -> Result<DatabaseConnection, ModelError> {
    let db = Database::connect(connect_options(cfg))
        .await
        .map_err(|e| ModelError::Db(e.to_string()))?;
    info!(backend = ?db.get_database_backend(), max_connections = cfg.max_connections, "database connected");
    Ok(db)
}

/// Round-trip a trivial query to confirm the store is reachable.
pub async fn test_connection(db: &DatabaseConnection) -> Result<(), ModelError> {
    let backend = db.get_database_backend();
    db.query_one(Statement::from_string(backend, "SELECT 1"))
        .await
        .map_err(|e| ModelError::Db(e.to_string()))?;
    Ok(())
}
