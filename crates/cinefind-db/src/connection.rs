//! Database connection management.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::Connection;

use super::migrations::run_migrations;

/// Database file name inside the data directory.
const DB_FILE_NAME: &str = "cinefind.db";

/// How long a writer waits for a lock held by another process
/// (e.g. `trending record` while the browser is open).
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (or creates) the database and runs migrations.
///
/// - If `dir` is `Some`, uses `{dir}/cinefind.db`.
/// - Otherwise uses `~/.local/share/cinefind/cinefind.db`.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrations fail.
pub fn open_db(dir: Option<&PathBuf>) -> Result<Connection> {
    let db_path = resolve_db_path(dir)?;

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let conn = Connection::open(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;
    conn.busy_timeout(BUSY_TIMEOUT)
        .context("failed to set busy timeout")?;

    run_migrations(&conn).context("database migration failed")?;
    tracing::debug!(path = %db_path.display(), "Database opened");

    Ok(conn)
}

/// Resolves the data directory holding the database and log file.
///
/// - If `dir` is `Some`, returns it unchanged.
/// - Otherwise returns `~/.local/share/cinefind`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined (when `dir` is `None`).
pub fn resolve_data_dir(dir: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.clone());
    }

    let home = std::env::var("HOME").context("HOME environment variable is not set")?;
    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join("cinefind"))
}

/// Resolves the database file path.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined (when `dir` is `None`).
pub fn resolve_db_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    Ok(resolve_data_dir(dir)?.join(DB_FILE_NAME))
}
