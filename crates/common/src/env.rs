//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;
use tracing::{info, warn};

/// For file-backed SQLite URLs (`sqlite://data/students.db?mode=rwc`), make sure
/// the parent directory of the database file exists. Other URLs are left alone.
pub async fn ensure_sqlite_dir(database_url: &str) -> anyhow::Result<()> {
    let Some(path) = sqlite_file_path(database_url) else { return Ok(()) };
    let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if tokio::fs::metadata(parent).await.is_err() {
        warn!(dir = %parent.display(), "sqlite data directory missing; creating it");
    }
    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
    info!(dir = %parent.display(), "sqlite data directory ready");
    Ok(())
}

fn sqlite_file_path(database_url: &str) -> Option<&str> {
    let rest = database_url.strip_prefix("sqlite:")?;
    let rest = rest.trim_start_matches("//");
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(path)
}
