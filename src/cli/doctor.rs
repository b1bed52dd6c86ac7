//! CLI `doctor` command: check the list files and the recipe database.

use anyhow::{Context, Result};

use crate::config::PantryConfig;
use crate::db;
use crate::ledger::{JsonFileStorage, ListKind, ListStorage};

/// Print a health report for the data dir and recipe store.
pub fn doctor(config: &PantryConfig) -> Result<()> {
    let data_dir = config.resolved_data_dir();

    println!("Pantry Health Report");
    println!("====================");
    println!();
    println!("Data dir:          {}", data_dir.display());
    println!("Export dir:        {}", config.resolved_export_dir().display());
    println!();

    let mut lists_ok = true;
    for kind in ListKind::ALL {
        let path = config.list_path(kind);
        // Read without the ledger so a missing file is reported, not created.
        match JsonFileStorage::new(&path).read() {
            Ok(Some(records)) => println!("{:<18} {} item(s)", format!("{kind}:"), records.len()),
            Ok(None) => println!("{:<18} not created yet", format!("{kind}:")),
            Err(e) => {
                lists_ok = false;
                println!("{:<18} ERROR {e}", format!("{kind}:"));
            }
        }
    }
    println!();

    let db_path = config.resolved_recipes_db();
    if !db_path.exists() {
        println!("Recipe store:      not found at {}", db_path.display());
        println!("Run `pantry recipes import <file>` to create it.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);
    let conn = db::open_database(&db_path).context("failed to open recipe store (may be corrupt)")?;
    let report = db::check_database_health(&conn).context("failed to run health check")?;

    println!("Recipe store:      {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("Schema version:    {}", report.schema_version);
    println!("  Recipes:         {}", report.recipe_count);
    println!("  Ingredients:     {}", report.ingredient_count);
    println!("  Tags:            {}", report.tag_count);
    println!();
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
        println!();
        println!("Recovery: delete {} and re-run `pantry recipes import`.", db_path.display());
    }

    if !lists_ok {
        println!();
        println!("A list file could not be parsed. Fix or remove it; a missing file starts empty.");
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
