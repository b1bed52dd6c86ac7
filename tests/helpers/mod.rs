#![allow(dead_code)]

use pantry::db;
use pantry::ledger::{IngredientRecord, ListStorage, StorageError};
use pantry::recipes::import::parse_recipes;
use pantry::recipes::SqliteRecipeStore;
use rusqlite::Connection;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "foreign_keys", "ON").unwrap();
    db::schema::init_schema(&conn).unwrap();
    db::migrations::run_migrations(&conn).unwrap();
    conn
}

/// An in-memory recipe store loaded with `json` (array or JSON lines).
pub fn recipe_store(json: &str) -> SqliteRecipeStore {
    let store = SqliteRecipeStore::from_connection(test_db());
    for recipe in parse_recipes(json).unwrap() {
        store.upsert_recipe(&recipe).unwrap();
    }
    store
}

pub const RECIPES: &str = r#"[
    {"id": 101, "slug": "jajecznica-na-masle", "title": "Jajecznica na maśle",
     "categories": [{"type": "IDEA", "name": "śniadanie"}],
     "ingredients": [{"name": "jajka", "quantity": "4 szt."}, {"name": "masło", "quantity": "1 łyżka"}, {"name": "szczypiorek"}]},
    {"id": 102, "slug": "pierogi-ruskie", "title": "Pierogi ruskie",
     "categories": [{"type": "DIET", "name": "wegetariańska"}],
     "ingredients": [{"name": "mąka pszenna", "quantity": "500 g"}, {"name": "ziemniaki", "quantity": "1 kg"}, {"name": "twaróg", "quantity": "400 g"}, {"name": "cebula", "quantity": "2 szt."}]}
]"#;

/// Storage that holds records in memory and fails every write while
/// `failing` is set.
#[derive(Clone, Default)]
pub struct FlakyStorage {
    pub inner: pantry::ledger::MemoryStorage,
    pub failing: Arc<AtomicBool>,
}

impl FlakyStorage {
    pub fn with_records(records: Vec<IngredientRecord>) -> Self {
        Self {
            inner: pantry::ledger::MemoryStorage::with_records(records),
            failing: Arc::default(),
        }
    }

    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl ListStorage for FlakyStorage {
    fn read(&self) -> Result<Option<Vec<IngredientRecord>>, StorageError> {
        self.inner.read()
    }

    fn write(&self, records: &[IngredientRecord]) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("disk full".into()));
        }
        self.inner.write(records)
    }

    fn describe(&self) -> String {
        "flaky".into()
    }
}

pub fn rec(ingredient: &str, quantity: f64, unit: Option<&str>, category: Option<&str>) -> IngredientRecord {
    IngredientRecord {
        ingredient: ingredient.into(),
        quantity,
        unit: unit.map(String::from),
        category: category.map(String::from),
    }
}
