use std::net::SocketAddr;

use axum::Router;
use configs::AppConfig;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::routes::{self, AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Where the running configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(String),
    /// No config file at that path; built from environment variables.
    Env { missing: String },
}

/// Load `config.toml` (or `CONFIG_PATH`); fall back to env vars only when the
/// file does not exist.
pub fn load_config() -> anyhow::Result<(AppConfig, ConfigSource)> {
    load_config_from(&configs::config_path())
}

pub fn load_config_from(path: &str) -> anyhow::Result<(AppConfig, ConfigSource)> {
    let (mut cfg, source) = read_config(path)?;
    cfg.normalize_and_validate()?;
    Ok((cfg, source))
}

fn read_config(path: &str) -> anyhow::Result<(AppConfig, ConfigSource)> {
    Ok(match configs::load_optional(path)? {
        Some(cfg) => (cfg, ConfigSource::File(path.to_string())),
        None => (AppConfig::from_env(), ConfigSource::Env { missing: path.to_string() }),
    })
}

/// Logged once the subscriber is installed.
pub fn log_config_source(source: &ConfigSource) {
    match source {
        ConfigSource::File(path) => info!(%path, "configuration loaded"),
        ConfigSource::Env { missing } => {
            warn!(path = %missing, "config file not found; using environment")
        }
    }
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

/// Public entry: connect, migrate, build the app and run the HTTP server
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    common::env::ensure_sqlite_dir(&cfg.database.url).await?;

    let db = models::db::connect_with_config(&cfg.database).await?;
    models::db::test_connection(&db).await?;
    if cfg.database.run_migrations {
        migration::Migrator::up(&db, None).await?;
        info!("migrations applied");
    }

    let app: Router = routes::build_router(AppState::new(db), build_cors());

    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting student records server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
