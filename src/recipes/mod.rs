//! Recipe lookup for the missing-ingredient tools.
//!
//! The tools only need one capability from a recipe store: find the first
//! recipe whose title contains a substring (case-insensitively) and list its
//! ingredient names. [`RecipeSource`] is that seam; [`store::SqliteRecipeStore`]
//! implements it over the local SQLite database that [`import`] fills from
//! crawled recipe data. [`planner`] compares a recipe against the fridge.

pub mod import;
pub mod planner;
pub mod store;

use anyhow::Result;
use serde::Serialize;

pub use store::SqliteRecipeStore;

/// A recipe found by title, with its ingredient names in recipe order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeMatch {
    pub title: String,
    pub ingredients: Vec<String>,
}

/// Query-by-title access to a recipe store.
///
/// Synchronous; callers in async contexts should use
/// `tokio::task::spawn_blocking`.
pub trait RecipeSource: Send + Sync {
    /// First recipe (in store order) whose title contains `title`,
    /// ignoring case.
    fn find_by_title(&self, title: &str) -> Result<Option<RecipeMatch>>;
}
