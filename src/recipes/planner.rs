//! What a recipe still needs, given the fridge.
//!
//! Fridge membership is checked by lower-cased name only. This is a
//! convenience comparison for recipe planning; ledger identity stays exact.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::{RecipeMatch, RecipeSource};
use crate::ledger::{IngredientRecord, Ledger, LedgerError, ListStorage};

/// Category given to shopping-list items added for a recipe.
pub const MISSING_CATEGORY_PREFIX: &str = "Brakujące do: ";

/// Result of comparing a recipe lookup against the fridge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecipePlan {
    /// No recipe title contained the query.
    NotFound { query: String },
    /// Every ingredient is already in the fridge.
    NothingMissing { title: String },
    /// Ingredients absent from the fridge, in recipe order.
    Missing { title: String, items: Vec<String> },
}

/// Recipe ingredients whose lower-cased name is not in the fridge.
pub fn missing_ingredients(fridge: &[IngredientRecord], recipe: &[String]) -> Vec<String> {
    let held: HashSet<String> = fridge
        .iter()
        .map(|record| record.ingredient.to_lowercase())
        .collect();

    recipe
        .iter()
        .filter(|name| !held.contains(&name.to_lowercase()))
        .cloned()
        .collect()
}

/// Compare a found recipe against the fridge.
pub fn plan_recipe(recipe: RecipeMatch, fridge: &[IngredientRecord]) -> RecipePlan {
    let items = missing_ingredients(fridge, &recipe.ingredients);
    if items.is_empty() {
        RecipePlan::NothingMissing {
            title: recipe.title,
        }
    } else {
        RecipePlan::Missing {
            title: recipe.title,
            items,
        }
    }
}

/// Look up `query` in `source` and compare the first match against the fridge.
pub fn plan_for_title(
    source: &dyn RecipeSource,
    query: &str,
    fridge: &[IngredientRecord],
) -> Result<RecipePlan> {
    Ok(match source.find_by_title(query)? {
        Some(recipe) => plan_recipe(recipe, fridge),
        None => RecipePlan::NotFound {
            query: query.to_string(),
        },
    })
}

/// Add each missing item to the shopping list: quantity 1, no unit,
/// category `Brakujące do: <title>`. Returns how many were added.
pub fn add_missing_to_shopping_list<S: ListStorage>(
    shopping_list: &mut Ledger<S>,
    title: &str,
    missing: &[String],
) -> Result<usize, LedgerError> {
    let category = format!("{MISSING_CATEGORY_PREFIX}{title}");
    for item in missing {
        shopping_list.add(IngredientRecord::new(item.clone(), 1.0).with_category(category.clone()))?;
    }
    tracing::info!(recipe = %title, added = missing.len(), "missing ingredients added to shopping list");
    Ok(missing.len())
}

/// File name for a recipe's shopping list: spaces become underscores, and
/// path separators are replaced so the file stays in its directory.
pub fn shopping_file_name(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    format!("lista_zakupow_{stem}.txt")
}

/// Plain-text checklist for a recipe's missing items.
pub fn render_shopping_file(title: &str, missing: &[String]) -> String {
    let mut out = format!("Lista zakupów dla przepisu: {title}\n");
    out.push_str(&"=".repeat(30));
    out.push('\n');
    for item in missing {
        out.push_str(&format!("- [ ] {item}\n"));
    }
    out
}

/// Write the checklist into `dir`, creating it if needed.
pub fn write_shopping_file(dir: &Path, title: &str, missing: &[String]) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(shopping_file_name(title));
    std::fs::write(&path, render_shopping_file(title, missing))?;
    tracing::info!(path = %path.display(), items = missing.len(), "shopping list file written");
    Ok(path)
}
