//! Forward-only schema migration framework.
//!
//! Tracks the schema version in `schema_meta` and runs sequential migrations
//! to bring the database up to [`CURRENT_SCHEMA_VERSION`].

use rusqlite::{params, Connection};

/// The schema version that the current binary expects.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Get the current schema version from the database.
pub fn get_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT value FROM schema_meta WHERE key = 'schema_version'",
        [],
        |row| {
            let val: String = row.get(0)?;
            Ok(val.parse::<u32>().unwrap_or(0))
        },
    )
}

/// Update the stored schema version.
fn update_schema_version(conn: &Connection, version: u32) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE schema_meta SET value = ?1 WHERE key = 'schema_version'",
        [version.to_string()],
    )?;
    Ok(())
}

/// Run any pending forward-only migrations. Each migration runs in a transaction.
pub fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
    let mut version = get_schema_version(conn)?;
    tracing::debug!(schema_version = version, target = CURRENT_SCHEMA_VERSION, "checking migrations");

    while version < CURRENT_SCHEMA_VERSION {
        let next = version + 1;
        tracing::info!(from = version, to = next, "running migration");

        let tx = conn.unchecked_transaction()?;
        match next {
            2 => migrate_v1_to_v2(&tx)?,
            _ => {
                tracing::error!(version = next, "unknown migration target");
                break;
            }
        }
        update_schema_version(&tx, next)?;
        tx.commit()?;

        version = next;
    }

    Ok(())
}

/// Lower-case a title for substring lookup. SQLite's `lower()` only folds
/// ASCII, so folding happens here.
pub fn fold_title(title: &str) -> String {
    title.to_lowercase()
}

/// Migration v1 → v2: add `recipes.title_folded` and backfill it.
fn migrate_v1_to_v2(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "ALTER TABLE recipes ADD COLUMN title_folded TEXT NOT NULL DEFAULT '';
         CREATE INDEX IF NOT EXISTS idx_recipes_title_folded ON recipes(title_folded);",
    )?;

    let titles: Vec<(i64, String)> = conn
        .prepare("SELECT id, title FROM recipes")?
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut update = conn.prepare("UPDATE recipes SET title_folded = ?1 WHERE id = ?2")?;
    for (id, title) in &titles {
        update.execute(params![fold_title(title), id])?;
    }

    tracing::info!(backfilled = titles.len(), "folded recipe titles");
    Ok(())
}
