//! A session's pair of ledgers.
//!
//! [`Pantry`] owns one fridge ledger and one shopping-list ledger. It is
//! created per session and handed to whoever needs it (tool server, CLI)
//! instead of living in process-wide state.

use std::path::Path;

use crate::ledger::{
    JsonFileStorage, Ledger, LedgerError, ListKind, ListStorage, RemoveOutcome, StorageError,
};
use crate::ledger::{AddOutcome, IngredientRecord};

#[derive(Debug)]
pub struct Pantry<S = JsonFileStorage> {
    fridge: Ledger<S>,
    shopping_list: Ledger<S>,
}

impl Pantry<JsonFileStorage> {
    /// Open both lists as JSON files inside `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self, StorageError> {
        let storage_for = |kind: ListKind| JsonFileStorage::new(data_dir.join(kind.file_name()));
        Ok(Self {
            fridge: Ledger::open(ListKind::Fridge, storage_for(ListKind::Fridge))?,
            shopping_list: Ledger::open(
                ListKind::ShoppingList,
                storage_for(ListKind::ShoppingList),
            )?,
        })
    }
}

impl<S: ListStorage> Pantry<S> {
    pub fn new(fridge: Ledger<S>, shopping_list: Ledger<S>) -> Self {
        Self {
            fridge,
            shopping_list,
        }
    }

    pub fn fridge(&self) -> &Ledger<S> {
        &self.fridge
    }

    pub fn shopping_list(&self) -> &Ledger<S> {
        &self.shopping_list
    }

    pub fn ledger(&self, kind: ListKind) -> &Ledger<S> {
        match kind {
            ListKind::Fridge => &self.fridge,
            ListKind::ShoppingList => &self.shopping_list,
        }
    }

    pub fn ledger_mut(&mut self, kind: ListKind) -> &mut Ledger<S> {
        match kind {
            ListKind::Fridge => &mut self.fridge,
            ListKind::ShoppingList => &mut self.shopping_list,
        }
    }

    /// Reload the list from storage and return its records.
    pub fn read(&mut self, kind: ListKind) -> Result<Vec<IngredientRecord>, StorageError> {
        Ok(self.ledger_mut(kind).load()?.to_vec())
    }

    pub fn add(
        &mut self,
        kind: ListKind,
        record: IngredientRecord,
    ) -> Result<AddOutcome, LedgerError> {
        self.ledger_mut(kind).add(record)
    }

    pub fn remove(
        &mut self,
        kind: ListKind,
        request: &IngredientRecord,
    ) -> Result<RemoveOutcome, LedgerError> {
        self.ledger_mut(kind).remove(request)
    }
}
