//! The ingredient ledger: merge-on-add, decrement-on-remove.
//!
//! A [`Ledger`] holds one named list (fridge or shopping list) as an ordered
//! sequence of [`IngredientRecord`]s. No two records ever share the
//! `(ingredient, unit)` identity key. Every mutation is written through to
//! the backing [`ListStorage`] before it becomes visible in memory, so a failed
//! write leaves both sides unchanged.

pub mod storage;
pub mod types;

pub use storage::{JsonFileStorage, ListStorage, MemoryStorage, StorageError};
pub use types::{AddOutcome, IngredientRecord, ListKind, RemoveOutcome, DEFAULT_CATEGORY};

/// Errors returned by ledger mutations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

/// One persisted, ordered list of ingredient records.
#[derive(Debug)]
pub struct Ledger<S = JsonFileStorage> {
    kind: ListKind,
    storage: S,
    records: Vec<IngredientRecord>,
}

impl<S: ListStorage> Ledger<S> {
    /// Open a ledger, loading whatever `storage` holds.
    ///
    /// A store with nothing persisted is initialized to an empty list.
    pub fn open(kind: ListKind, storage: S) -> Result<Self, StorageError> {
        let records = load_or_init(&storage)?;
        tracing::debug!(
            list = %kind,
            storage = %storage.describe(),
            items = records.len(),
            "ledger opened"
        );
        Ok(Self {
            kind,
            storage,
            records,
        })
    }

    pub fn kind(&self) -> ListKind {
        self.kind
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Records currently held, in insertion order.
    pub fn records(&self) -> &[IngredientRecord] {
        &self.records
    }

    /// Re-read the backing store, picking up changes made by other writers.
    pub fn load(&mut self) -> Result<&[IngredientRecord], StorageError> {
        self.records = load_or_init(&self.storage)?;
        Ok(&self.records)
    }

    /// Persist the current records.
    pub fn save(&self) -> Result<(), StorageError> {
        self.storage.write(&self.records)
    }

    /// Add `record`, merging into an existing record with the same
    /// `(ingredient, unit)` key or appending it.
    ///
    /// On merge the existing category and unit are kept. A record without a
    /// category gets [`DEFAULT_CATEGORY`].
    pub fn add(&mut self, mut record: IngredientRecord) -> Result<AddOutcome, LedgerError> {
        if record.ingredient.is_empty() {
            return Err(LedgerError::InvalidRecord(
                "ingredient name must not be empty".into(),
            ));
        }
        check_quantity(record.quantity)?;
        record
            .category
            .get_or_insert_with(|| DEFAULT_CATEGORY.to_string());

        let mut next = self.records.clone();
        let ingredient = record.ingredient.clone();
        let outcome = merge_record(&mut next, record);
        if let AddOutcome::Merged { quantity } = outcome {
            if !quantity.is_finite() {
                return Err(LedgerError::InvalidRecord(format!(
                    "total quantity of {ingredient} would overflow"
                )));
            }
        }
        self.commit(next)?;

        tracing::info!(list = %self.kind, ingredient = %ingredient, outcome = ?outcome, "ingredient added");
        Ok(outcome)
    }

    /// Subtract `request.quantity` from the record sharing its
    /// `(ingredient, unit)` key. `request.category` is ignored.
    ///
    /// If the held amount is less than or equal to the request the record is
    /// dropped. An absent record is reported as [`RemoveOutcome::NotFound`];
    /// the unchanged list is still persisted.
    pub fn remove(&mut self, request: &IngredientRecord) -> Result<RemoveOutcome, LedgerError> {
        check_quantity(request.quantity)?;

        let mut next = self.records.clone();
        let outcome = subtract_record(&mut next, request);
        self.commit(next)?;

        if outcome.is_not_found() {
            tracing::info!(
                list = %self.kind,
                ingredient = %request.ingredient,
                unit = ?request.unit,
                "ingredient not found"
            );
        } else {
            tracing::info!(list = %self.kind, ingredient = %request.ingredient, outcome = ?outcome, "ingredient removed");
        }
        Ok(outcome)
    }

    /// Total quantity held under the exact `(ingredient, unit)` key.
    pub fn quantity_of(&self, ingredient: &str, unit: Option<&str>) -> Option<f64> {
        self.records
            .iter()
            .find(|r| r.ingredient == ingredient && r.unit.as_deref() == unit)
            .map(|r| r.quantity)
    }

    fn commit(&mut self, next: Vec<IngredientRecord>) -> Result<(), StorageError> {
        if let Err(e) = self.storage.write(&next) {
            tracing::error!(list = %self.kind, storage = %self.storage.describe(), error = %e, "failed to persist list");
            return Err(e);
        }
        self.records = next;
        Ok(())
    }
}

fn load_or_init<S: ListStorage>(storage: &S) -> Result<Vec<IngredientRecord>, StorageError> {
    match storage.read()? {
        Some(records) => normalize_loaded(storage, records),
        None => {
            tracing::info!(storage = %storage.describe(), "no persisted list, initializing empty");
            storage.write(&[])?;
            Ok(Vec::new())
        }
    }
}

/// Enforce the ledger invariants on persisted data. Negative or non-finite
/// quantities are rejected. Records sharing a key collapse into the first
/// occurrence, which keeps its unit and category and takes the summed
/// quantity.
fn normalize_loaded<S: ListStorage>(
    storage: &S,
    records: Vec<IngredientRecord>,
) -> Result<Vec<IngredientRecord>, StorageError> {
    let invalid = |reason: String| StorageError::Invalid {
        location: storage.describe(),
        reason,
    };

    let loaded = records.len();
    let mut collapsed: Vec<IngredientRecord> = Vec::with_capacity(loaded);
    for record in records {
        if !record.quantity.is_finite() || record.quantity < 0.0 {
            return Err(invalid(format!(
                "{} has quantity {}",
                record.ingredient, record.quantity
            )));
        }
        if let AddOutcome::Merged { quantity } = merge_record(&mut collapsed, record) {
            if !quantity.is_finite() {
                return Err(invalid("duplicate records sum to a non-finite quantity".into()));
            }
        }
    }

    if collapsed.len() < loaded {
        tracing::warn!(
            storage = %storage.describe(),
            duplicates = loaded - collapsed.len(),
            "collapsed records sharing an (ingredient, unit) key"
        );
    }
    Ok(collapsed)
}

fn check_quantity(quantity: f64) -> Result<(), LedgerError> {
    if quantity.is_finite() && quantity > 0.0 {
        Ok(())
    } else {
        Err(LedgerError::InvalidRecord(format!(
            "quantity must be a positive number, got {quantity}"
        )))
    }
}

/// Merge `record` into `records` by identity key. Pure list logic, no I/O.
pub fn merge_record(records: &mut Vec<IngredientRecord>, record: IngredientRecord) -> AddOutcome {
    match records.iter_mut().find(|r| r.same_identity(&record)) {
        Some(existing) => {
            existing.quantity += record.quantity;
            AddOutcome::Merged {
                quantity: existing.quantity,
            }
        }
        None => {
            records.push(record);
            AddOutcome::Appended
        }
    }
}

/// Subtract `request` from `records` by identity key. Pure list logic, no I/O.
pub fn subtract_record(
    records: &mut Vec<IngredientRecord>,
    request: &IngredientRecord,
) -> RemoveOutcome {
    let Some(index) = records.iter().position(|r| r.same_identity(request)) else {
        return RemoveOutcome::NotFound;
    };

    if records[index].quantity <= request.quantity {
        records.remove(index);
        RemoveOutcome::Removed
    } else {
        records[index].quantity -= request.quantity;
        RemoveOutcome::Decremented {
            remaining: records[index].quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_ledger() -> (Ledger<MemoryStorage>, MemoryStorage) {
        let storage = MemoryStorage::new();
        let ledger = Ledger::open(ListKind::Fridge, storage.clone()).unwrap();
        (ledger, storage)
    }

    #[test]
    fn open_initializes_empty_store() {
        let (ledger, storage) = empty_ledger();
        assert!(ledger.records().is_empty());
        assert_eq!(storage.snapshot(), Some(vec![]));
    }

    #[test]
    fn adding_twice_doubles_quantity() {
        let (mut ledger, _) = empty_ledger();
        let record = IngredientRecord::new("jajka", 6.0).with_unit("szt");

        assert_eq!(ledger.add(record.clone()).unwrap(), AddOutcome::Appended);
        assert_eq!(
            ledger.add(record).unwrap(),
            AddOutcome::Merged { quantity: 12.0 }
        );
        assert_eq!(ledger.records().len(), 1);
        assert_eq!(ledger.records()[0].quantity, 12.0);
    }

    #[test]
    fn different_units_stay_separate() {
        let (mut ledger, _) = empty_ledger();
        ledger
            .add(IngredientRecord::new("mleko", 1.0).with_unit("l"))
            .unwrap();
        ledger
            .add(IngredientRecord::new("mleko", 1.0).with_unit("ml"))
            .unwrap();

        assert_eq!(ledger.records().len(), 2);
        assert_eq!(ledger.quantity_of("mleko", Some("l")), Some(1.0));
        assert_eq!(ledger.quantity_of("mleko", Some("ml")), Some(1.0));
    }

    #[test]
    fn names_match_case_sensitively() {
        let (mut ledger, _) = empty_ledger();
        ledger.add(IngredientRecord::new("Mleko", 1.0)).unwrap();
        ledger.add(IngredientRecord::new("mleko", 1.0)).unwrap();
        assert_eq!(ledger.records().len(), 2);
    }

    #[test]
    fn merge_keeps_first_category() {
        let (mut ledger, _) = empty_ledger();
        ledger
            .add(
                IngredientRecord::new("mleko", 1.0)
                    .with_unit("l")
                    .with_category("Nabiał"),
            )
            .unwrap();
        ledger
            .add(
                IngredientRecord::new("mleko", 1.0)
                    .with_unit("l")
                    .with_category("Napoje"),
            )
            .unwrap();

        assert_eq!(
            ledger.records(),
            &[IngredientRecord::new("mleko", 2.0)
                .with_unit("l")
                .with_category("Nabiał")]
        );
    }

    #[test]
    fn missing_category_defaults_to_inne() {
        let (mut ledger, _) = empty_ledger();
        ledger.add(IngredientRecord::new("cebula", 2.0)).unwrap();
        assert_eq!(ledger.records()[0].category.as_deref(), Some("Inne"));
    }

    #[test]
    fn insertion_order_is_preserved() {
        let (mut ledger, _) = empty_ledger();
        for name in ["pomidory", "ogórki", "chleb"] {
            ledger.add(IngredientRecord::new(name, 1.0)).unwrap();
        }
        ledger.add(IngredientRecord::new("pomidory", 2.0)).unwrap();

        let names: Vec<&str> = ledger
            .records()
            .iter()
            .map(|r| r.ingredient.as_str())
            .collect();
        assert_eq!(names, ["pomidory", "ogórki", "chleb"]);
    }

    #[test]
    fn remove_more_than_held_drops_record() {
        let (mut ledger, _) = empty_ledger();
        ledger
            .add(IngredientRecord::new("jajka", 3.0).with_unit("szt"))
            .unwrap();

        let outcome = ledger
            .remove(&IngredientRecord::new("jajka", 5.0).with_unit("szt"))
            .unwrap();
        assert_eq!(outcome, RemoveOutcome::Removed);
        assert!(ledger.records().is_empty());
    }

    #[test]
    fn remove_exact_amount_drops_record() {
        let (mut ledger, _) = empty_ledger();
        ledger.add(IngredientRecord::new("jajka", 3.0)).unwrap();
        let outcome = ledger.remove(&IngredientRecord::new("jajka", 3.0)).unwrap();
        assert_eq!(outcome, RemoveOutcome::Removed);
        assert!(ledger.records().is_empty());
    }

    #[test]
    fn remove_less_than_held_decrements() {
        let (mut ledger, _) = empty_ledger();
        ledger.add(IngredientRecord::new("jajka", 10.0)).unwrap();

        let outcome = ledger.remove(&IngredientRecord::new("jajka", 3.0)).unwrap();
        assert_eq!(outcome, RemoveOutcome::Decremented { remaining: 7.0 });
        assert_eq!(ledger.records()[0].quantity, 7.0);
    }

    #[test]
    fn remove_requires_matching_unit() {
        let (mut ledger, _) = empty_ledger();
        ledger
            .add(IngredientRecord::new("mąka", 1.0).with_unit("kg"))
            .unwrap();

        let outcome = ledger.remove(&IngredientRecord::new("mąka", 1.0)).unwrap();
        assert!(outcome.is_not_found());
        assert_eq!(ledger.records().len(), 1);
    }

    #[test]
    fn remove_absent_is_not_found_and_persists_unchanged() {
        let (mut ledger, storage) = empty_ledger();
        let outcome = ledger
            .remove(&IngredientRecord::new("brokuły", 1.0))
            .unwrap();
        assert_eq!(outcome, RemoveOutcome::NotFound);
        assert!(ledger.records().is_empty());
        assert_eq!(storage.snapshot(), Some(vec![]));
    }

    #[test]
    fn non_positive_quantities_are_rejected() {
        let (mut ledger, storage) = empty_ledger();
        for quantity in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = ledger
                .add(IngredientRecord::new("cukier", quantity))
                .unwrap_err();
            assert!(matches!(err, LedgerError::InvalidRecord(_)));
        }
        let err = ledger
            .remove(&IngredientRecord::new("cukier", -2.0))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidRecord(_)));
        assert_eq!(storage.snapshot(), Some(vec![]));
    }

    #[test]
    fn empty_name_is_rejected() {
        let (mut ledger, _) = empty_ledger();
        let err = ledger.add(IngredientRecord::new("", 1.0)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidRecord(_)));
    }

    #[test]
    fn every_mutation_is_written_through() {
        let (mut ledger, storage) = empty_ledger();
        ledger.add(IngredientRecord::new("masło", 1.0)).unwrap();
        assert_eq!(storage.snapshot().unwrap(), ledger.records());

        ledger.remove(&IngredientRecord::new("masło", 1.0)).unwrap();
        assert_eq!(storage.snapshot(), Some(vec![]));
    }

    #[test]
    fn load_picks_up_external_changes() {
        let (mut ledger, storage) = empty_ledger();
        storage
            .write(&[IngredientRecord::new("kawa", 1.0).with_unit("opak.")])
            .unwrap();

        let records = ledger.load().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ingredient, "kawa");
    }

    #[test]
    fn merge_and_subtract_are_pure() {
        let mut records = vec![IngredientRecord::new("ryż", 1.0).with_unit("kg")];
        merge_record(&mut records, IngredientRecord::new("ryż", 0.5).with_unit("kg"));
        assert_eq!(records[0].quantity, 1.5);

        let outcome = subtract_record(&mut records, &IngredientRecord::new("ryż", 2.0).with_unit("kg"));
        assert_eq!(outcome, RemoveOutcome::Removed);
        assert!(records.is_empty());
    }

    #[test]
    fn overflowing_total_is_rejected_and_not_persisted() {
        let (mut ledger, storage) = empty_ledger();
        ledger.add(IngredientRecord::new("sól", 1.5e308)).unwrap();

        let err = ledger.add(IngredientRecord::new("sól", 1.5e308)).unwrap_err();

        assert!(matches!(err, LedgerError::InvalidRecord(_)));
        assert_eq!(ledger.quantity_of("sól", None), Some(1.5e308));
        assert_eq!(storage.snapshot().unwrap()[0].quantity, 1.5e308);
    }

    #[test]
    fn duplicate_keys_collapse_on_open() {
        let storage = MemoryStorage::with_records(vec![
            IngredientRecord::new("jajka", 2.0).with_unit("szt").with_category("Nabiał"),
            IngredientRecord::new("mleko", 1.0).with_unit("l"),
            IngredientRecord::new("jajka", 3.0).with_unit("szt").with_category("Inne"),
        ]);
        let mut ledger = Ledger::open(ListKind::Fridge, storage).unwrap();

        assert_eq!(ledger.records().len(), 2);
        assert_eq!(
            ledger.records()[0],
            IngredientRecord::new("jajka", 5.0).with_unit("szt").with_category("Nabiał")
        );

        ledger.add(IngredientRecord::new("jajka", 1.0).with_unit("szt")).unwrap();
        assert_eq!(ledger.quantity_of("jajka", Some("szt")), Some(6.0));
        assert_eq!(ledger.records().len(), 2);
    }

    #[test]
    fn negative_persisted_quantity_is_invalid() {
        let storage = MemoryStorage::with_records(vec![IngredientRecord::new("cukier", -1.0)]);
        let err = Ledger::open(ListKind::Fridge, storage).unwrap_err();
        assert!(matches!(err, StorageError::Invalid { .. }));
    }
}
