//! CLI `recipes` commands: import crawled recipes, check what one is missing.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

use crate::config::PantryConfig;
use crate::ledger::ListKind;
use crate::recipes::import::{import_recipes, read_recipe_file};
use crate::recipes::planner::{self, RecipePlan};
use crate::recipes::SqliteRecipeStore;

/// What `recipes missing` does with the missing items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingMode {
    Show,
    Add,
    File,
}

/// Load a crawler output file into the recipe store.
pub fn import(config: &PantryConfig, file: &Path) -> Result<()> {
    let recipes = read_recipe_file(file)?;
    let db_path = config.resolved_recipes_db();
    let store = SqliteRecipeStore::open(&db_path)?;

    println!("Importing {} recipes into {}...", recipes.len(), db_path.display());

    let pb = ProgressBar::new(recipes.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {bar:40.cyan/blue} {pos}/{len} {msg}")
            .context("invalid progress template")?
            .progress_chars("##-"),
    );

    let summary = import_recipes(&store, &recipes, |recipe| {
        pb.set_message(recipe.slug.clone());
        pb.inc(1);
    });
    pb.finish_and_clear();

    println!("Import complete:");
    println!("  Recipes imported: {}", summary.imported);
    if summary.failed > 0 {
        println!("  Recipes failed:   {} (see log)", summary.failed);
    }
    println!("  Recipes in store: {}", store.recipe_count()?);
    Ok(())
}

/// Compare a recipe against the fridge and show, add, or export the gap.
pub fn missing(config: &PantryConfig, title: &str, mode: MissingMode) -> Result<()> {
    let store = SqliteRecipeStore::open(config.resolved_recipes_db())?;
    let fridge = super::open_ledger(config, ListKind::Fridge)?;

    let (title, items) = match planner::plan_for_title(&store, title, fridge.records())? {
        RecipePlan::NotFound { query } => {
            println!("No recipe matches '{query}'.");
            return Ok(());
        }
        RecipePlan::NothingMissing { title } => {
            println!("You already have every ingredient for {title}.");
            return Ok(());
        }
        RecipePlan::Missing { title, items } => (title, items),
    };

    match mode {
        MissingMode::Show => {
            println!("Missing for {title}:");
            for item in &items {
                println!("  - {item}");
            }
        }
        MissingMode::Add => {
            let mut shopping_list = super::open_ledger(config, ListKind::ShoppingList)?;
            let added = planner::add_missing_to_shopping_list(&mut shopping_list, &title, &items)?;
            println!("Added {added} item(s) for {title} to the shopping list.");
        }
        MissingMode::File => {
            let path = planner::write_shopping_file(&config.resolved_export_dir(), &title, &items)
                .context("failed to write shopping list file")?;
            println!("Wrote {} item(s) to {}", items.len(), path.display());
        }
    }
    Ok(())
}
