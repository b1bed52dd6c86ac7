//! Crawled recipe records and their import into the store.
//!
//! The crawler emits one JSON object per recipe, either as a JSON array or as
//! JSON lines. Field names follow the source site's API (`recipePrepTime`,
//! `recipeYield`, `recipeCuisine`, `categories`).

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::path::Path;

use super::store::SqliteRecipeStore;

#[derive(Debug, Clone, Deserialize)]
pub struct CrawledRecipe {
    /// Source-site id; numeric ids are kept as text.
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "recipePrepTime", deserialize_with = "lenient_string")]
    pub prep_time: Option<String>,
    #[serde(default, rename = "recipeYield", deserialize_with = "lenient_string")]
    pub yield_amount: Option<String>,
    #[serde(default, rename = "recipeCuisine")]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub categories: Vec<CrawledCategory>,
    #[serde(default)]
    pub ingredients: Vec<CrawledIngredient>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrawledCategory {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrawledIngredient {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub quantity: Option<String>,
}

/// An ingredient row as stored: trimmed name, quantity text (possibly empty).
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientLine {
    pub name: String,
    pub quantity: String,
}

impl CrawledRecipe {
    /// Ingredient rows in recipe order. Blank names are dropped and a name
    /// that repeats keeps only its first occurrence.
    pub fn ingredient_lines(&self) -> Vec<IngredientLine> {
        let mut seen = HashSet::new();
        self.ingredients
            .iter()
            .filter_map(|ingredient| {
                let name = ingredient.name.trim();
                if name.is_empty() || !seen.insert(name.to_string()) {
                    return None;
                }
                Some(IngredientLine {
                    name: name.to_string(),
                    quantity: ingredient
                        .quantity
                        .as_deref()
                        .map(str::trim)
                        .unwrap_or_default()
                        .to_string(),
                })
            })
            .collect()
    }

    /// `(kind, name)` tags: `DIET` categories become `diet`, `IDEA`
    /// categories become `occasion`; other category types are ignored.
    pub fn tags(&self) -> Vec<(&'static str, &str)> {
        self.categories
            .iter()
            .filter_map(|category| {
                let kind = match category.kind.as_str() {
                    "DIET" => "diet",
                    "IDEA" => "occasion",
                    _ => return None,
                };
                Some((kind, category.name.as_str()))
            })
            .collect()
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// Parse a JSON array of recipes, a single recipe object, or JSON lines.
pub fn parse_recipes(text: &str) -> Result<Vec<CrawledRecipe>> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).context("failed to parse recipe array");
    }

    // One object per line; a single pretty-printed object also parses here.
    if let Ok(recipe) = serde_json::from_str::<CrawledRecipe>(trimmed) {
        return Ok(vec![recipe]);
    }

    trimmed
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("failed to parse recipe on line {}", i + 1))
        })
        .collect()
}

/// Counts from an import run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ImportSummary {
    pub imported: usize,
    pub failed: usize,
}

/// Upsert every recipe, calling `on_progress` after each one.
///
/// A recipe that fails to store is logged and counted; the rest still import.
pub fn import_recipes(
    store: &SqliteRecipeStore,
    recipes: &[CrawledRecipe],
    mut on_progress: impl FnMut(&CrawledRecipe),
) -> ImportSummary {
    let mut summary = ImportSummary::default();
    for recipe in recipes {
        match store.upsert_recipe(recipe) {
            Ok(_) => summary.imported += 1,
            Err(e) => {
                tracing::warn!(slug = %recipe.slug, error = %e, "recipe import failed");
                summary.failed += 1;
            }
        }
        on_progress(recipe);
    }
    tracing::info!(imported = summary.imported, failed = summary.failed, "recipe import finished");
    summary
}

/// Read and parse a crawler output file.
pub fn read_recipe_file(path: &Path) -> Result<Vec<CrawledRecipe>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read recipe file: {}", path.display()))?;
    parse_recipes(&text)
}
