pub mod migrations;
pub mod schema;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

/// Open (or create) the recipe database at the given path, with schema
/// initialized and migrations applied.
pub fn open_database(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;

    // WAL lets the crawler import while the server reads
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.busy_timeout(std::time::Duration::from_millis(5000))?;

    schema::init_schema(&conn).context("failed to initialize schema")?;
    migrations::run_migrations(&conn).context("failed to run migrations")?;

    tracing::info!(path = %path.display(), "database initialized");
    Ok(conn)
}

/// Open a migrated in-memory database.
pub fn open_memory_database() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    schema::init_schema(&conn).context("failed to initialize schema")?;
    migrations::run_migrations(&conn).context("failed to run migrations")?;
    Ok(conn)
}

/// Result of [`check_database_health`].
#[derive(Debug)]
pub struct HealthReport {
    pub schema_version: u32,
    pub recipe_count: i64,
    pub ingredient_count: i64,
    pub tag_count: i64,
    pub integrity_ok: bool,
    pub integrity_details: String,
}

/// Run `PRAGMA integrity_check` and collect row counts.
pub fn check_database_health(conn: &Connection) -> Result<HealthReport> {
    let integrity: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
    let count = |table: &str| -> Result<i64> {
        Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?)
    };

    Ok(HealthReport {
        schema_version: migrations::get_schema_version(conn)?,
        recipe_count: count("recipes")?,
        ingredient_count: count("recipe_ingredients")?,
        tag_count: count("recipe_tags")?,
        integrity_ok: integrity == "ok",
        integrity_details: integrity,
    })
}
