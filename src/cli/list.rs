use anyhow::Result;

use crate::config::PantryConfig;
use crate::ledger::ListKind;

/// Print one list.
pub fn list(config: &PantryConfig, kind: ListKind) -> Result<()> {
    let ledger = super::open_ledger(config, kind)?;
    super::print_records(kind.title(), ledger.records());
    Ok(())
}
