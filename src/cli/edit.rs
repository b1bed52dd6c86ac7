//! CLI `add` / `remove` commands.
//!
//! Ingredient names are trimmed before the exact-match ledger lookup.

use anyhow::Result;

use crate::config::PantryConfig;
use crate::ledger::{AddOutcome, IngredientRecord, ListKind, RemoveOutcome};

pub fn add(
    config: &PantryConfig,
    kind: ListKind,
    ingredient: &str,
    quantity: f64,
    unit: Option<String>,
    category: Option<String>,
) -> Result<()> {
    let mut ledger = super::open_ledger(config, kind)?;
    let record = IngredientRecord {
        ingredient: ingredient.trim().to_string(),
        quantity,
        unit,
        category,
    };
    let label = record.to_string();

    match ledger.add(record)? {
        AddOutcome::Appended => println!("Added {label} to {}.", kind.title()),
        AddOutcome::Merged { quantity } => {
            println!("{} already held {ingredient}; now {quantity}.", kind.title())
        }
    }
    Ok(())
}

pub fn remove(
    config: &PantryConfig,
    kind: ListKind,
    ingredient: &str,
    quantity: f64,
    unit: Option<String>,
) -> Result<()> {
    let mut ledger = super::open_ledger(config, kind)?;
    let request = IngredientRecord {
        ingredient: ingredient.trim().to_string(),
        quantity,
        unit,
        category: None,
    };

    match ledger.remove(&request)? {
        RemoveOutcome::Removed => println!("Removed {ingredient} from {}.", kind.title()),
        RemoveOutcome::Decremented { remaining } => {
            println!("{ingredient}: {remaining} left on {}.", kind.title())
        }
        RemoveOutcome::NotFound => {
            let unit = request.unit.as_deref().map(|u| format!(" [{u}]")).unwrap_or_default();
            println!("{ingredient}{unit} is not on {}; nothing removed.", kind.title());
        }
    }
    Ok(())
}
