//! Dataset table decoded from the sealed bundle
//!
//! CSV with a header row. Required columns: `lab`, `member`, `uri`;
//! other columns are ignored.

use serde::Deserialize;

use crate::error::SpaceError;

/// One dataset row before enrichment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatasetRow {
    #[serde(rename = "lab")]
    pub group: String,
    pub member: String,
    #[serde(rename = "uri")]
    pub reference: String,
}

/// Parse the dataset text
pub fn parse_dataset(text: &str) -> Result<Vec<DatasetRow>, SpaceError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (line, result) in reader.deserialize::<DatasetRow>().enumerate() {
        let row = result
            .map_err(|e| SpaceError::Dataset(format!("row {}: {}", line + 1, e)))?;
        if row.reference.is_empty() {
            return Err(SpaceError::Dataset(format!("row {}: empty uri", line + 1)));
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(SpaceError::Dataset("dataset has no rows".to_string()));
    }

    tracing::debug!(rows = rows.len(), "Dataset parsed");
    Ok(rows)
}
