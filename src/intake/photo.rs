//! Photo of a shopping list → OCR → structuring → records.

use std::path::Path;

use super::{IngredientStructurer, StructuringError, TextExtractor, VisionError};
use crate::ledger::IngredientRecord;

#[derive(Debug, thiserror::Error)]
pub enum PhotoImportError {
    #[error("failed to read image {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Vision(#[from] VisionError),
    #[error(transparent)]
    Structuring(#[from] StructuringError),
}

/// Read an image from disk.
pub async fn read_image(path: &Path) -> Result<Vec<u8>, PhotoImportError> {
    tokio::fs::read(path)
        .await
        .map_err(|source| PhotoImportError::Image {
            path: path.display().to_string(),
            source,
        })
}

/// Run OCR on `image` and structure the extracted lines into records.
///
/// A photo with no readable text yields no records and skips the
/// structuring call.
pub async fn records_from_photo(
    image: &[u8],
    extractor: &dyn TextExtractor,
    structurer: &dyn IngredientStructurer,
) -> Result<Vec<IngredientRecord>, PhotoImportError> {
    let lines = extractor.extract_lines(image).await?;
    if lines.is_empty() {
        tracing::info!("no text found in photo");
        return Ok(Vec::new());
    }

    let text = lines.join("\n");
    let records = structurer.structure(&text).await?;
    tracing::info!(lines = lines.len(), records = records.len(), "photo structured");
    Ok(records)
}
