//! # Loader
//!
//! Turns the raw `eco.json` payload into an ordered collection of [`Trail`]s.
//!
//! Admission is intentionally loose compared with [`validate`](crate::validate):
//! a record only needs to be an object with a truthy `id`. Missing names are
//! logged and tolerated; coordinates and sub-object types are not checked here.

use std::path::Path;

use chrono::{DateTime, Local};
use log::{info, warn};
use serde_json::{Map, Value};

use crate::config::TRAILS_FIELD;
use crate::error::{Result, TrailError};
use crate::trail::{is_truthy, Trail};

/// Read and parse the data file at `path`.
pub fn read_collection(path: &Path) -> Result<Vec<Trail>> {
    info!("[Loader] Loading trails from {}", path.display());
    let bytes = std::fs::read(path).map_err(|e| TrailError::io(path, e))?;
    parse_collection(&bytes, Local::now())
}

/// Parse a payload and apply the admission rules to each record.
///
/// Every admitted record is stamped with `loaded_at` and its position in the
/// unfiltered source array.
pub fn parse_collection(bytes: &[u8], loaded_at: DateTime<Local>) -> Result<Vec<Trail>> {
    let raw: Value = serde_json::from_slice(bytes)?;

    let Value::Object(mut top) = raw else {
        return Err(TrailError::format("top-level JSON value must be an object"));
    };
    let Some(Value::Array(records)) = top.shift_remove(TRAILS_FIELD) else {
        return Err(TrailError::format(format!(
            "field '{TRAILS_FIELD}' must be a list of trails"
        )));
    };

    let source_count = records.len();
    let mut trails = Vec::with_capacity(source_count);

    for (index, record) in records.into_iter().enumerate() {
        match admit(index, record) {
            Ok(fields) => trails.push(Trail::from_raw(fields, index, loaded_at)),
            Err(e) => warn!("[Loader] Skipping record: {}", e),
        }
    }

    info!(
        "[Loader] Loaded {} of {} trails",
        trails.len(),
        source_count
    );
    Ok(trails)
}

/// Load-time admission rule for a single source record.
pub fn admit(index: usize, record: Value) -> Result<Map<String, Value>> {
    let Value::Object(fields) = record else {
        return Err(TrailError::RecordInvalid {
            index,
            reason: "record is not an object".to_string(),
        });
    };

    let Some(id) = fields.get("id").filter(|v| is_truthy(v)) else {
        return Err(TrailError::RecordInvalid {
            index,
            reason: "missing or empty id".to_string(),
        });
    };

    if !fields.get("name").is_some_and(is_truthy) {
        warn!("[Loader] Trail {} at position {} has no name", id, index);
    }

    Ok(fields)
}
