//! Terminal subcommands. Each works on the same files the MCP server uses.

pub mod doctor;
pub mod edit;
pub mod list;
pub mod photo;
pub mod recipes;

use anyhow::{Context, Result};

use crate::config::PantryConfig;
use crate::ledger::{IngredientRecord, JsonFileStorage, Ledger, ListKind};

/// Open the JSON-backed ledger for `kind`, creating an empty file if needed.
pub(crate) fn open_ledger(config: &PantryConfig, kind: ListKind) -> Result<Ledger> {
    let path = config.list_path(kind);
    Ledger::open(kind, JsonFileStorage::new(&path))
        .with_context(|| format!("failed to open {kind} at {}", path.display()))
}

/// Print records one per line under a heading.
pub(crate) fn print_records(heading: &str, records: &[IngredientRecord]) {
    println!("{heading}");
    println!("{}", "=".repeat(40));
    if records.is_empty() {
        println!("  (empty)");
    }
    for record in records {
        println!("  {record}");
    }
}
