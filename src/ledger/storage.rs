//! Backing stores for ledgers.
//!
//! [`ListStorage`] is the seam between a [`Ledger`](super::Ledger) and
//! wherever its records live. [`JsonFileStorage`] writes an indented JSON
//! document per list; [`MemoryStorage`] keeps records in process.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::types::IngredientRecord;

/// Errors raised while reading or writing a list.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed list data in {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode list data: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("invalid list data in {location}: {reason}")]
    Invalid { location: String, reason: String },
}

/// Persistence for one ordered list of records.
///
/// Implementations are synchronous and blocking; async callers should go
/// through `tokio::task::spawn_blocking`.
pub trait ListStorage: Send {
    /// Read the persisted records. `Ok(None)` means nothing has been persisted yet.
    fn read(&self) -> Result<Option<Vec<IngredientRecord>>, StorageError>;

    /// Replace the persisted records with `records`.
    fn write(&self, records: &[IngredientRecord]) -> Result<(), StorageError>;

    /// Short description for logs (a path, or "memory").
    fn describe(&self) -> String;
}

/// One list per JSON file, pretty-printed.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ListStorage for JsonFileStorage {
    fn read(&self) -> Result<Option<Vec<IngredientRecord>>, StorageError> {
        if !self.path.is_file() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        let records =
            serde_json::from_str(&contents).map_err(|source| StorageError::Malformed {
                path: self.path.clone(),
                source,
            })?;
        Ok(Some(records))
    }

    /// Writes to a `.tmp` sibling, then renames over the target.
    fn write(&self, records: &[IngredientRecord]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let mut json = serde_json::to_string_pretty(records).map_err(StorageError::Encode)?;
        json.push('\n');

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-process storage. Clones share the same records, so a test can keep a
/// handle and inspect what the ledger persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    records: Arc<Mutex<Option<Vec<IngredientRecord>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `records` already persisted.
    pub fn with_records(records: Vec<IngredientRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(Some(records))),
        }
    }

    /// Copy of the persisted records, or `None` if nothing was written yet.
    pub fn snapshot(&self) -> Option<Vec<IngredientRecord>> {
        self.records.lock().ok().and_then(|guard| guard.clone())
    }
}

impl ListStorage for MemoryStorage {
    fn read(&self) -> Result<Option<Vec<IngredientRecord>>, StorageError> {
        let guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Unavailable(format!("memory storage lock poisoned: {e}")))?;
        Ok(guard.clone())
    }

    fn write(&self, records: &[IngredientRecord]) -> Result<(), StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Unavailable(format!("memory storage lock poisoned: {e}")))?;
        *guard = Some(records.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".into()
    }
}
