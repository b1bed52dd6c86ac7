//! SQLite-backed recipe store.
//!
//! Recipes are upserted by slug: re-importing a recipe keeps its row (and so
//! its position in lookup order) and replaces its ingredients and tags.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;
use std::sync::Mutex;

use super::import::CrawledRecipe;
use super::{RecipeMatch, RecipeSource};
use crate::db::migrations::fold_title;

/// Base URL for recipes that come without an explicit `url`.
pub const DEFAULT_RECIPE_BASE_URL: &str = "https://aniagotuje.pl/przepis/";

pub struct SqliteRecipeStore {
    conn: Mutex<Connection>,
}

impl SqliteRecipeStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_connection(crate::db::open_database(path)?))
    }

    /// Wrap an already-initialized connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Insert or update one recipe. Returns the recipe's row id.
    pub fn upsert_recipe(&self, recipe: &CrawledRecipe) -> Result<i64> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("db lock poisoned: {e}"))?;
        let tx = conn.transaction()?;
        let id = upsert_in_tx(&tx, recipe)
            .with_context(|| format!("failed to store recipe {}", recipe.slug))?;
        tx.commit()?;
        Ok(id)
    }

    pub fn recipe_count(&self) -> Result<i64> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("db lock poisoned: {e}"))?;
        Ok(conn.query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))?)
    }
}

fn upsert_in_tx(tx: &Transaction, recipe: &CrawledRecipe) -> Result<i64> {
    anyhow::ensure!(!recipe.slug.trim().is_empty(), "recipe has an empty slug");
    anyhow::ensure!(!recipe.title.trim().is_empty(), "recipe has an empty title");

    let now = chrono::Utc::now().to_rfc3339();
    let url = recipe
        .url
        .clone()
        .unwrap_or_else(|| format!("{DEFAULT_RECIPE_BASE_URL}{}", recipe.slug));

    tx.execute(
        "INSERT INTO recipes (slug, source_id, title, title_folded, url, prep_time, yield_amount, cuisine, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) \
         ON CONFLICT(slug) DO UPDATE SET \
            source_id = excluded.source_id, \
            title = excluded.title, \
            title_folded = excluded.title_folded, \
            url = excluded.url, \
            prep_time = excluded.prep_time, \
            yield_amount = excluded.yield_amount, \
            cuisine = excluded.cuisine, \
            updated_at = excluded.updated_at",
        params![
            recipe.slug,
            recipe.id,
            recipe.title,
            fold_title(&recipe.title),
            url,
            recipe.prep_time,
            recipe.yield_amount,
            recipe.cuisine,
            now,
        ],
    )?;

    let recipe_id: i64 = tx.query_row(
        "SELECT id FROM recipes WHERE slug = ?1",
        params![recipe.slug],
        |row| row.get(0),
    )?;

    tx.execute(
        "DELETE FROM recipe_ingredients WHERE recipe_id = ?1",
        params![recipe_id],
    )?;
    tx.execute("DELETE FROM recipe_tags WHERE recipe_id = ?1", params![recipe_id])?;

    let mut insert_ingredient = tx.prepare(
        "INSERT INTO recipe_ingredients (recipe_id, position, name, quantity) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for (position, ingredient) in recipe.ingredient_lines().into_iter().enumerate() {
        insert_ingredient.execute(params![
            recipe_id,
            position as i64,
            ingredient.name,
            ingredient.quantity,
        ])?;
    }

    let mut insert_tag = tx.prepare(
        "INSERT OR IGNORE INTO recipe_tags (recipe_id, kind, name) VALUES (?1, ?2, ?3)",
    )?;
    for (kind, name) in recipe.tags() {
        insert_tag.execute(params![recipe_id, kind, name])?;
    }

    Ok(recipe_id)
}

impl RecipeSource for SqliteRecipeStore {
    fn find_by_title(&self, title: &str) -> Result<Option<RecipeMatch>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("db lock poisoned: {e}"))?;

        let found: Option<(i64, String)> = conn
            .query_row(
                "SELECT id, title FROM recipes WHERE instr(title_folded, ?1) > 0 ORDER BY id LIMIT 1",
                params![fold_title(title)],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((recipe_id, title)) = found else {
            tracing::debug!(query = %title, "no recipe matched");
            return Ok(None);
        };

        let ingredients = conn
            .prepare("SELECT name FROM recipe_ingredients WHERE recipe_id = ?1 ORDER BY position")?
            .query_map(params![recipe_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        tracing::debug!(title = %title, ingredients = ingredients.len(), "recipe matched");
        Ok(Some(RecipeMatch { title, ingredients }))
    }
}
