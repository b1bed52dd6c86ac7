//! SQL DDL for the recipe store.
//!
//! Defines the `recipes`, `recipe_ingredients`, `recipe_tags` and
//! `schema_meta` tables. All DDL uses `IF NOT EXISTS` for idempotent
//! initialization. Later columns are added by [`super::migrations`].

use rusqlite::Connection;

/// All schema DDL statements for the v1 recipe store.
const SCHEMA_SQL: &str = r#"
-- One row per crawled recipe, keyed by its site slug
CREATE TABLE IF NOT EXISTS recipes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    slug TEXT NOT NULL UNIQUE,
    source_id TEXT,
    title TEXT NOT NULL,
    url TEXT,
    prep_time TEXT,
    yield_amount TEXT,
    cuisine TEXT,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_recipes_title ON recipes(title);

-- Ingredients in recipe order
CREATE TABLE IF NOT EXISTS recipe_ingredients (
    recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    name TEXT NOT NULL,
    quantity TEXT NOT NULL DEFAULT '',
    PRIMARY KEY (recipe_id, position)
);

CREATE INDEX IF NOT EXISTS idx_recipe_ingredients_name ON recipe_ingredients(name);

-- Diet and occasion labels
CREATE TABLE IF NOT EXISTS recipe_tags (
    recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
    kind TEXT NOT NULL CHECK(kind IN ('diet','occasion')),
    name TEXT NOT NULL,
    PRIMARY KEY (recipe_id, kind, name)
);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}
