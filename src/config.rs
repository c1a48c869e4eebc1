//! Store configuration and crate-wide constants.

use std::path::{Path, PathBuf};

/// Default location of the trail data file, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "data/eco.json";

/// Identity written into `export_info.exported_by`.
pub const DEFAULT_EXPORTED_BY: &str = "EcoTrails System";

/// Top-level array field holding the trail records.
pub const TRAILS_FIELD: &str = "eco_trails";

/// Statistics bucket for records without a usable region.
pub const UNKNOWN_REGION: &str = "Unknown region";

/// Statistics bucket for records without a usable difficulty.
pub const UNSPECIFIED_DIFFICULTY: &str = "Unspecified difficulty";

/// Configuration for a [`TrailStore`](crate::TrailStore).
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// Path of the JSON file backing the collection.
    /// Default: `data/eco.json`
    pub data_path: PathBuf,

    /// Value of `export_info.exported_by` in exported files.
    /// Default: "EcoTrails System"
    pub exported_by: String,
}

impl StoreConfig {
    /// Create a config pointing at the given data file, other fields default.
    pub fn with_data_path(path: impl AsRef<Path>) -> Self {
        Self {
            data_path: path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Override the exporter identity.
    pub fn exported_by(mut self, exported_by: impl Into<String>) -> Self {
        self.exported_by = exported_by.into();
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            exported_by: DEFAULT_EXPORTED_BY.to_string(),
        }
    }
}
