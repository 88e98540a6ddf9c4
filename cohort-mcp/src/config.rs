//! Server configuration from the environment

use cohort_stats::{DEFAULT_BIN_COUNT, MAX_BIN_COUNT};
use std::path::PathBuf;

pub const DEFAULT_DATA_PATH: &str = "/app/cohort/patients.json";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// JSON file holding the patient array
    pub data_path: PathBuf,
    /// Bin count for histograms when the caller gives none
    pub histogram_bins: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            histogram_bins: DEFAULT_BIN_COUNT,
        }
    }
}

impl ServerConfig {
    /// Read `COHORT_DATA_PATH` and `COHORT_HISTOGRAM_BINS`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("COHORT_DATA_PATH").filter(|p| !p.trim().is_empty()) {
            config.data_path = PathBuf::from(path);
        }

        if let Some(raw) = lookup("COHORT_HISTOGRAM_BINS") {
            match raw.trim().parse::<usize>() {
                Ok(bins) if (1..=MAX_BIN_COUNT).contains(&bins) => config.histogram_bins = bins,
                _ => tracing::warn!(
                    value = %raw,
                    fallback = DEFAULT_BIN_COUNT,
                    "COHORT_HISTOGRAM_BINS is not an integer between 1 and the maximum, using default"
                ),
            }
        }

        config
    }
}
