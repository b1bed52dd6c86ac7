//! Turning free text and photos into ledger records.
//!
//! Provides the [`IngredientStructurer`] and [`TextExtractor`] traits for the
//! two external services, their HTTP clients, and [`apply_records`], which
//! feeds whatever those services returned into a ledger.
//!
//! The ledger never depends on anything here; errors from these services are
//! turned into messages by the tool server and CLI.

pub mod photo;
pub mod structuring;
pub mod vision;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::{StructuringConfig, VisionConfig};
use crate::ledger::{AddOutcome, IngredientRecord, Ledger, LedgerError, ListStorage};

pub use structuring::{ChatStructurer, StructuringError};
pub use vision::{AzureVisionReader, VisionError};

/// Converts free text mentioning ingredients into structured records.
///
/// Records come back with quantity defaulted to 1 when the text gave none.
/// Output is non-deterministic; malformed replies are a [`StructuringError`].
#[async_trait]
pub trait IngredientStructurer: Send + Sync {
    async fn structure(&self, text: &str) -> Result<Vec<IngredientRecord>, StructuringError>;
}

/// Extracts raw text lines from an image.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_lines(&self, image: &[u8]) -> Result<Vec<String>, VisionError>;
}

/// Stand-in used when a service has no credentials. Every call fails with
/// the reason it was not configured.
#[derive(Debug, Clone)]
pub struct Unconfigured {
    reason: String,
}

#[async_trait]
impl IngredientStructurer for Unconfigured {
    async fn structure(&self, _text: &str) -> Result<Vec<IngredientRecord>, StructuringError> {
        Err(StructuringError::NotConfigured(self.reason.clone()))
    }
}

#[async_trait]
impl TextExtractor for Unconfigured {
    async fn extract_lines(&self, _image: &[u8]) -> Result<Vec<String>, VisionError> {
        Err(VisionError::NotConfigured(self.reason.clone()))
    }
}

/// Create the structuring client from config, or an [`Unconfigured`] stand-in.
pub fn create_structurer(config: &StructuringConfig) -> Arc<dyn IngredientStructurer> {
    match ChatStructurer::from_config(config) {
        Ok(client) => {
            tracing::info!(endpoint = %config.endpoint, model = %config.model, "structuring service ready");
            Arc::new(client)
        }
        Err(e) => {
            tracing::warn!(error = %e, "structuring service disabled");
            Arc::new(Unconfigured {
                reason: e.to_string(),
            })
        }
    }
}

/// Create the vision client from config, or an [`Unconfigured`] stand-in.
pub fn create_extractor(config: &VisionConfig) -> Arc<dyn TextExtractor> {
    match AzureVisionReader::from_config(config) {
        Ok(client) => {
            tracing::info!(endpoint = %config.endpoint, "vision service ready");
            Arc::new(client)
        }
        Err(e) => {
            tracing::warn!(error = %e, "vision service disabled");
            Arc::new(Unconfigured {
                reason: e.to_string(),
            })
        }
    }
}

/// Summary of feeding a batch of records into a ledger.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct IntakeReport {
    /// Records appended as new items.
    pub added: usize,
    /// Records merged into an existing item.
    pub merged: usize,
    /// Records the ledger refused, with the reason.
    pub skipped: Vec<String>,
}

impl IntakeReport {
    pub fn applied(&self) -> usize {
        self.added + self.merged
    }
}

/// A storage failure part-way through a batch. `applied` counts the records
/// saved before it.
#[derive(Debug, thiserror::Error)]
#[error("{source}; {} earlier record(s) were already saved", .applied.applied())]
pub struct IntakeError {
    pub applied: IntakeReport,
    #[source]
    pub source: LedgerError,
}

/// Add every record to `ledger`.
///
/// Records the ledger rejects as invalid are skipped and reported. A storage
/// failure stops the batch and is returned with what was saved so far.
pub fn apply_records<S: ListStorage>(
    ledger: &mut Ledger<S>,
    records: Vec<IngredientRecord>,
) -> Result<IntakeReport, IntakeError> {
    let mut report = IntakeReport::default();

    for record in records {
        let label = record.to_string();
        match ledger.add(record) {
            Ok(AddOutcome::Appended) => report.added += 1,
            Ok(AddOutcome::Merged { .. }) => report.merged += 1,
            Err(LedgerError::InvalidRecord(reason)) => {
                tracing::warn!(list = %ledger.kind(), record = %label, %reason, "skipping record");
                report.skipped.push(format!("{label}: {reason}"));
            }
            Err(source) => {
                return Err(IntakeError {
                    applied: report,
                    source,
                })
            }
        }
    }

    Ok(report)
}
