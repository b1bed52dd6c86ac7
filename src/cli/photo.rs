//! CLI `photo` command: OCR a shopping-list photo and add what it says.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::PantryConfig;
use crate::intake::{self, photo};
use crate::ledger::ListKind;

pub async fn photo(config: &PantryConfig, kind: ListKind, image: &Path) -> Result<()> {
    let extractor = intake::create_extractor(&config.vision);
    let structurer = intake::create_structurer(&config.structuring);

    let bytes = photo::read_image(image).await?;
    let records = photo::records_from_photo(&bytes, extractor.as_ref(), structurer.as_ref())
        .await
        .context("photo import failed")?;

    if records.is_empty() {
        println!("No products recognised in {}.", image.display());
        return Ok(());
    }

    let mut ledger = super::open_ledger(config, kind)?;
    let report = intake::apply_records(&mut ledger, records)?;

    println!("Photo import into {}:", kind.title());
    println!("  Added:   {}", report.added);
    println!("  Merged:  {}", report.merged);
    if !report.skipped.is_empty() {
        println!("  Skipped: {}", report.skipped.len());
        for reason in &report.skipped {
            println!("    {reason}");
        }
    }
    Ok(())
}
