//! Patient record sources

use crate::patient::Patient;
use cohort_core::StatsError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for loading patient records
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid record file {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Record file {} must contain a JSON array", .0.display())]
    NotAnArray(PathBuf),
}

impl From<SourceError> for StatsError {
    fn from(err: SourceError) -> Self {
        StatsError::source_error(err.to_string())
    }
}

/// Anything that can supply the full list of registry records
pub trait PatientSource: Send + Sync {
    fn fetch_all(&self) -> Result<Vec<Patient>, SourceError>;
}

/// Fixed set of records held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    patients: Vec<Patient>,
}

impl InMemorySource {
    pub fn new(patients: Vec<Patient>) -> Self {
        Self { patients }
    }
}

impl PatientSource for InMemorySource {
    fn fetch_all(&self) -> Result<Vec<Patient>, SourceError> {
        Ok(self.patients.clone())
    }
}

/// JSON file holding an array of records, re-read on every fetch.
///
/// Records that fail to decode on their own are skipped with a warning so one
/// malformed entry does not hide the rest of the registry.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PatientSource for JsonFileSource {
    fn fetch_all(&self) -> Result<Vec<Patient>, SourceError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;

        let doc: serde_json::Value = serde_json::from_str(&text).map_err(|source| SourceError::Json {
            path: self.path.clone(),
            source,
        })?;

        let records = match doc {
            serde_json::Value::Array(records) => records,
            _ => return Err(SourceError::NotAnArray(self.path.clone())),
        };

        let total = records.len();
        let patients: Vec<Patient> = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value::<Patient>(record) {
                Ok(p) => Some(p),
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping undecodable patient record");
                    None
                }
            })
            .collect();

        tracing::debug!(path = %self.path.display(), total, loaded = patients.len(), "loaded patient records");
        Ok(patients)
    }
}
